use super::fitness_value::TargetId;
use std::collections::HashMap;

/// Bidirectional mapping between numeric target ids and their descriptive
/// ids (e.g. `Line_at_Foo_00012` or `200:GET:/api/items`).
///
/// Targets synthesized during evaluation get negative ids, allocated on
/// first sight, so they never clash with the ids of the instrumentation.
/// Local descriptive ids are resolved only against other local targets: a
/// remote target reported under the same text keeps its own id.
#[derive(Debug, Clone, Default)]
pub struct IdMapper {
    mapping: HashMap<TargetId, String>,
    local_ids: HashMap<String, TargetId>,
    local_counter: TargetId,
}

impl IdMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the descriptive id reported for an instrumentation target
    pub fn add_mapping(&mut self, id: TargetId, descriptive_id: &str) {
        self.mapping.insert(id, descriptive_id.to_string());
    }

    pub fn descriptive_id(&self, id: TargetId) -> Option<&str> {
        self.mapping.get(&id).map(String::as_str)
    }

    /// Id of a locally synthesized target, allocating a new negative id the
    /// first time `descriptive_id` is seen
    pub fn handle_local_target(&mut self, descriptive_id: &str) -> TargetId {
        if let Some(id) = self.local_ids.get(descriptive_id) {
            return *id;
        }
        self.local_counter -= 1;
        let id = self.local_counter;
        self.mapping.insert(id, descriptive_id.to_string());
        self.local_ids.insert(descriptive_id.to_string(), id);
        id
    }

    pub fn is_local(id: TargetId) -> bool {
        id < 0
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_targets_are_negative_and_stable() {
        let mut mapper = IdMapper::new();
        let a = mapper.handle_local_target("200:GET:/items");
        let b = mapper.handle_local_target("404:GET:/items");
        assert_eq!(a, -1);
        assert_eq!(b, -2);
        assert_eq!(mapper.handle_local_target("200:GET:/items"), a);
        assert!(IdMapper::is_local(a));
        assert_eq!(mapper.descriptive_id(b), Some("404:GET:/items"));
    }

    #[test]
    fn test_remote_mapping() {
        let mut mapper = IdMapper::new();
        mapper.add_mapping(42, "Line_at_Foo_00012");
        assert_eq!(mapper.descriptive_id(42), Some("Line_at_Foo_00012"));
        assert!(!IdMapper::is_local(42));
        assert_eq!(mapper.len(), 1);
    }

    #[test]
    fn test_local_and_remote_ids_do_not_alias() {
        let mut mapper = IdMapper::new();
        mapper.add_mapping(5, "200:GET:/x");

        let local = mapper.handle_local_target("200:GET:/x");
        assert!(IdMapper::is_local(local));
        assert_ne!(local, 5);
        assert_eq!(mapper.handle_local_target("200:GET:/x"), local);
        assert_eq!(mapper.descriptive_id(5), Some("200:GET:/x"));
        assert_eq!(mapper.descriptive_id(local), Some("200:GET:/x"));
        assert_eq!(mapper.len(), 2);
    }
}
