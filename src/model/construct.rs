use thiserror::Error;

pub const MIN_CONSTRUCTS: usize = 4;
pub const MAX_ABBREVIATION_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstructId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct Construct {
    pub id: ConstructId,
    pub name: String,
    pub abbreviation: String,
    pub description: String,
}

/// Directed edge: `influencer` -> `influenced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub influencer: ConstructId,
    pub influenced: ConstructId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("abbreviation '{0}' must be 1-{MAX_ABBREVIATION_LEN} ASCII letters or digits ending in a letter")]
    InvalidAbbreviation(String),
    #[error("abbreviation '{0}' is already used in this model")]
    DuplicateAbbreviation(String),
    #[error("unknown construct {0:?}")]
    UnknownConstruct(ConstructId),
    #[error("unknown construct abbreviation '{0}'")]
    UnknownAbbreviation(String),
    #[error("construct '{0}' cannot influence itself")]
    SelfLoop(String),
    #[error("mutual relations are not allowed ('{influenced}' already influences '{influencer}')")]
    MutualRelation {
        influencer: String,
        influenced: String,
    },
    #[error("the model needs {MIN_CONSTRUCTS} or more constructs, found {0}")]
    TooFewConstructs(usize),
    #[error("construct '{0}' is not linked to any other construct")]
    UnrelatedConstruct(String),
}

/// Path diagram of one study: constructs by stable id in insertion order plus
/// the relation list. Every mutation sets the `edited` flag.
#[derive(Debug, Clone)]
pub struct StructuralModel {
    pub name: String,
    constructs: Vec<Construct>,
    relations: Vec<Relation>,
    next_id: u32,
    edited: bool,
}

impl StructuralModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructs: Vec::new(),
            relations: Vec::new(),
            next_id: 0,
            edited: true,
        }
    }

    pub fn constructs(&self) -> &[Construct] {
        &self.constructs
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    pub fn mark_edited(&mut self) {
        self.edited = true;
    }

    pub fn mark_clean(&mut self) {
        self.edited = false;
    }

    pub fn add_construct(
        &mut self,
        name: impl Into<String>,
        abbreviation: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<ConstructId, ModelError> {
        let abbreviation = abbreviation.into();
        if !is_valid_abbreviation(&abbreviation) {
            return Err(ModelError::InvalidAbbreviation(abbreviation));
        }
        if self.find_by_abbreviation(&abbreviation).is_some() {
            return Err(ModelError::DuplicateAbbreviation(abbreviation));
        }
        let id = ConstructId(self.next_id);
        self.next_id += 1;
        self.constructs.push(Construct {
            id,
            name: name.into(),
            abbreviation,
            description: description.into(),
        });
        self.edited = true;
        Ok(id)
    }

    /// Removes the construct and every relation touching it.
    pub fn remove_construct(&mut self, id: ConstructId) -> Result<Construct, ModelError> {
        let pos = self.position(id).ok_or(ModelError::UnknownConstruct(id))?;
        let removed = self.constructs.remove(pos);
        self.relations
            .retain(|r| r.influencer != id && r.influenced != id);
        self.edited = true;
        Ok(removed)
    }

    /// Adding a relation that already exists is a no-op.
    pub fn add_relation(
        &mut self,
        influencer: ConstructId,
        influenced: ConstructId,
    ) -> Result<(), ModelError> {
        let from = self.get(influencer)?.abbreviation.clone();
        let to = self.get(influenced)?.abbreviation.clone();
        if influencer == influenced {
            return Err(ModelError::SelfLoop(from));
        }
        if self.has_relation(influenced, influencer) {
            return Err(ModelError::MutualRelation {
                influencer: from,
                influenced: to,
            });
        }
        if self.has_relation(influencer, influenced) {
            return Ok(());
        }
        self.relations.push(Relation {
            influencer,
            influenced,
        });
        self.edited = true;
        Ok(())
    }

    pub fn has_relation(&self, influencer: ConstructId, influenced: ConstructId) -> bool {
        self.relations
            .iter()
            .any(|r| r.influencer == influencer && r.influenced == influenced)
    }

    pub fn get(&self, id: ConstructId) -> Result<&Construct, ModelError> {
        self.constructs
            .iter()
            .find(|c| c.id == id)
            .ok_or(ModelError::UnknownConstruct(id))
    }

    pub fn position(&self, id: ConstructId) -> Option<usize> {
        self.constructs.iter().position(|c| c.id == id)
    }

    pub fn find_by_abbreviation(&self, abbreviation: &str) -> Option<&Construct> {
        self.constructs
            .iter()
            .find(|c| c.abbreviation == abbreviation)
    }

    pub fn outgoing(&self, id: ConstructId) -> impl Iterator<Item = ConstructId> + '_ {
        self.relations
            .iter()
            .filter(move |r| r.influencer == id)
            .map(|r| r.influenced)
    }

    pub fn relation_count(&self, id: ConstructId) -> usize {
        self.relations
            .iter()
            .filter(|r| r.influencer == id || r.influenced == id)
            .count()
    }

    /// Checks that the model can be scored: enough constructs, none isolated.
    pub fn validate_for_scoring(&self) -> Result<(), ModelError> {
        if self.constructs.len() < MIN_CONSTRUCTS {
            return Err(ModelError::TooFewConstructs(self.constructs.len()));
        }
        for construct in &self.constructs {
            if self.relation_count(construct.id) == 0 {
                return Err(ModelError::UnrelatedConstruct(
                    construct.abbreviation.clone(),
                ));
            }
        }
        Ok(())
    }

    /// Human-readable relation list, e.g. `Performance Expectancy to Behavioral Intention`.
    pub fn describe_relations(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.relations.len());
        for r in &self.relations {
            let (Ok(from), Ok(to)) = (self.get(r.influencer), self.get(r.influenced)) else {
                continue;
            };
            out.push(format!("{} to {}", from.name, to.name));
        }
        out
    }
}

fn is_valid_abbreviation(abbreviation: &str) -> bool {
    !abbreviation.is_empty()
        && abbreviation.len() <= MAX_ABBREVIATION_LEN
        && abbreviation.chars().all(|c| c.is_ascii_alphanumeric())
        && abbreviation.ends_with(|c: char| c.is_ascii_alphabetic())
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/construct.rs"]
mod tests;
