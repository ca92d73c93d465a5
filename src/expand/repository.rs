use super::InstanceDescriptor;
use crate::error::RepositoryError;
use ahash::AHashSet;

/// Whatever accepts instance descriptors for scheduling.
///
/// Callers hand expanded descriptors over one at a time; the expander never
/// talks to a repository itself.
pub trait InstanceRepository {
    type Handle;
    type Error;

    fn schedule(&mut self, instance: InstanceDescriptor) -> Result<Self::Handle, Self::Error>;
}

/// Keeps scheduled descriptors in memory. Handles are the descriptor ids.
#[derive(Debug, Default)]
pub struct LocalRepository {
    instances: Vec<InstanceDescriptor>,
    ids: AHashSet<String>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instances(&self) -> &[InstanceDescriptor] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl InstanceRepository for LocalRepository {
    type Handle = String;
    type Error = RepositoryError;

    fn schedule(&mut self, instance: InstanceDescriptor) -> Result<String, RepositoryError> {
        if !self.ids.insert(instance.id.clone()) {
            return Err(RepositoryError::DuplicateInstance(instance.id));
        }
        let handle = instance.id.clone();
        self.instances.push(instance);
        Ok(handle)
    }
}
