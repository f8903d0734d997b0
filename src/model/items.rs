use thiserror::Error;

use crate::model::construct::{ConstructId, StructuralModel};

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub code: String,
    pub text: String,
    pub reversed: bool,
}

/// Items asked for one construct.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemBlock {
    pub construct: ConstructId,
    pub abbreviation: String,
    pub items: Vec<Item>,
}

impl ItemBlock {
    pub fn codes(&self) -> Vec<String> {
        self.items.iter().map(|i| i.code.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionnaireError {
    #[error("answer scale must be at least 2, got {0}")]
    InvalidScale(u8),
    #[error("no item block for construct {0:?}")]
    UnknownBlock(ConstructId),
    #[error("question '{text}' already exists within '{abbreviation}'")]
    DuplicateQuestion { abbreviation: String, text: String },
    #[error("item block '{0}' has no items")]
    EmptyBlock(String),
}

#[derive(Debug, Clone)]
pub struct Questionnaire {
    pub scale: u8,
    blocks: Vec<ItemBlock>,
}

impl Questionnaire {
    pub fn new(scale: u8) -> Result<Self, QuestionnaireError> {
        if scale < 2 {
            return Err(QuestionnaireError::InvalidScale(scale));
        }
        Ok(Self {
            scale,
            blocks: Vec::new(),
        })
    }

    /// One block per construct, in model order. Existing blocks are kept and
    /// blocks of removed constructs are dropped.
    pub fn sync_blocks(&mut self, model: &StructuralModel) {
        let mut blocks = Vec::with_capacity(model.constructs().len());
        for construct in model.constructs() {
            let existing = self
                .blocks
                .iter()
                .position(|b| b.construct == construct.id)
                .map(|pos| self.blocks[pos].clone());
            blocks.push(existing.unwrap_or_else(|| ItemBlock {
                construct: construct.id,
                abbreviation: construct.abbreviation.clone(),
                items: Vec::new(),
            }));
        }
        self.blocks = blocks;
    }

    #[cfg(test)]
    pub fn blocks(&self) -> &[ItemBlock] {
        &self.blocks
    }

    pub fn block(&self, construct: ConstructId) -> Result<&ItemBlock, QuestionnaireError> {
        self.blocks
            .iter()
            .find(|b| b.construct == construct)
            .ok_or(QuestionnaireError::UnknownBlock(construct))
    }

    /// Appends a question and returns its generated code.
    pub fn add_item(
        &mut self,
        construct: ConstructId,
        text: impl Into<String>,
        reversed: bool,
    ) -> Result<String, QuestionnaireError> {
        let text = text.into();
        let block = self
            .blocks
            .iter_mut()
            .find(|b| b.construct == construct)
            .ok_or(QuestionnaireError::UnknownBlock(construct))?;
        if block.items.iter().any(|i| i.text == text) {
            return Err(QuestionnaireError::DuplicateQuestion {
                abbreviation: block.abbreviation.clone(),
                text,
            });
        }
        let code = next_item_code(&block.abbreviation, block.items.len());
        block.items.push(Item {
            code: code.clone(),
            text,
            reversed,
        });
        Ok(code)
    }

    pub fn item(&self, code: &str) -> Option<&Item> {
        self.blocks
            .iter()
            .flat_map(|b| b.items.iter())
            .find(|i| i.code == code)
    }

    /// Item codes in block order, then question order.
    pub fn item_codes(&self) -> Vec<String> {
        self.blocks
            .iter()
            .flat_map(|b| b.items.iter().map(|i| i.code.clone()))
            .collect()
    }

    pub fn validate_blocks(&self) -> Result<(), QuestionnaireError> {
        for block in &self.blocks {
            if block.items.is_empty() {
                return Err(QuestionnaireError::EmptyBlock(block.abbreviation.clone()));
            }
        }
        Ok(())
    }
}

/// `PE` with two existing items yields `PE3`.
pub fn next_item_code(abbreviation: &str, existing: usize) -> String {
    format!("{}{}", abbreviation, existing + 1)
}

pub fn reverse_value(value: u8, scale: u8) -> u8 {
    scale - value + 1
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/items.rs"]
mod tests;
