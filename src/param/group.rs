//! Parameter groups: the ordered tree of parameters on a node.
//!
//! Groups only hold handles; the parameters themselves live in the graph's
//! arena, which lookups by name take as an argument.

use crate::graph::{ParameterArena, ParameterId};

use super::PinKind;

/// Separator between group names in a parameter path, e.g. `"Transform.Position"`.
pub const PATH_SEPARATOR: char = '.';

/// One entry in a parameter group.
#[derive(Clone, Debug, PartialEq)]
pub enum GroupEntry {
    Parameter(ParameterId),
    Group(ParameterGroup),
}

/// A named, ordered collection of parameters and nested groups.
///
/// Names are unique within one level. The graph editor enforces this when it
/// adds parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterGroup {
    name: String,
    entries: Vec<GroupEntry>,
}

impl ParameterGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn entries(&self) -> &[GroupEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ------------------------------------------------------------------
    // Insertion and removal
    // ------------------------------------------------------------------

    /// Appends a parameter at this level.
    pub fn add_parameter(&mut self, id: ParameterId) {
        self.entries.push(GroupEntry::Parameter(id));
    }

    /// Inserts a parameter at the front of this level.
    pub fn prepend_parameter(&mut self, id: ParameterId) {
        self.entries.insert(0, GroupEntry::Parameter(id));
    }

    /// Inserts `id` right before `anchor`, wherever `anchor` sits in the tree.
    pub fn insert_parameter_before(&mut self, id: ParameterId, anchor: ParameterId) -> bool {
        self.insert_relative(id, anchor, 0)
    }

    /// Inserts `id` right after `anchor`, wherever `anchor` sits in the tree.
    pub fn insert_parameter_after(&mut self, id: ParameterId, anchor: ParameterId) -> bool {
        self.insert_relative(id, anchor, 1)
    }

    fn insert_relative(&mut self, id: ParameterId, anchor: ParameterId, offset: usize) -> bool {
        if let Some(index) = self
            .entries
            .iter()
            .position(|e| matches!(e, GroupEntry::Parameter(p) if *p == anchor))
        {
            self.entries.insert(index + offset, GroupEntry::Parameter(id));
            return true;
        }
        self.entries.iter_mut().any(|entry| match entry {
            GroupEntry::Group(group) => group.insert_relative(id, anchor, offset),
            GroupEntry::Parameter(_) => false,
        })
    }

    /// Appends a nested group at this level.
    pub fn add_group(&mut self, group: ParameterGroup) {
        self.entries.push(GroupEntry::Group(group));
    }

    /// Removes a parameter from wherever it sits in the tree.
    pub fn remove_parameter(&mut self, id: ParameterId) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|e| !matches!(e, GroupEntry::Parameter(p) if *p == id));
        if self.entries.len() != before {
            return true;
        }
        self.entries.iter_mut().any(|entry| match entry {
            GroupEntry::Group(group) => group.remove_parameter(id),
            GroupEntry::Parameter(_) => false,
        })
    }

    /// Removes a direct subgroup by name and hands it back.
    pub fn remove_group(&mut self, name: &str) -> Option<ParameterGroup> {
        let index = self
            .entries
            .iter()
            .position(|e| matches!(e, GroupEntry::Group(g) if g.name == name))?;
        match self.entries.remove(index) {
            GroupEntry::Group(group) => Some(group),
            GroupEntry::Parameter(_) => None,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// True if the parameter sits anywhere in this tree.
    pub fn contains(&self, id: ParameterId) -> bool {
        self.entries.iter().any(|entry| match entry {
            GroupEntry::Parameter(p) => *p == id,
            GroupEntry::Group(group) => group.contains(id),
        })
    }

    /// True if a parameter or group named `name` sits directly at this level.
    pub fn contains_name(&self, name: &str, arena: &ParameterArena) -> bool {
        self.entries.iter().any(|entry| match entry {
            GroupEntry::Parameter(p) => arena.get(*p).is_some_and(|p| p.name() == name),
            GroupEntry::Group(group) => group.name == name,
        })
    }

    /// Resolves a parameter by path.
    ///
    /// `"Transform.Position"` descends into the `Transform` group. A bare
    /// name is looked up at this level first, then in nested groups, depth first.
    pub fn parameter(&self, path: &str, arena: &ParameterArena) -> Option<ParameterId> {
        match path.split_once(PATH_SEPARATOR) {
            Some((group_name, rest)) => self.group(group_name)?.parameter(rest, arena),
            None => self.direct_parameter(path, arena).or_else(|| {
                self.subgroups()
                    .find_map(|group| group.parameter(path, arena))
            }),
        }
    }

    fn direct_parameter(&self, name: &str, arena: &ParameterArena) -> Option<ParameterId> {
        self.entries.iter().find_map(|entry| match entry {
            GroupEntry::Parameter(p) if arena.get(*p).is_some_and(|p| p.name() == name) => {
                Some(*p)
            }
            _ => None,
        })
    }

    /// A group sitting directly at this level.
    pub fn child_group(&self, name: &str) -> Option<&ParameterGroup> {
        self.subgroups().find(|g| g.name == name)
    }

    pub fn child_group_mut(&mut self, name: &str) -> Option<&mut ParameterGroup> {
        self.entries.iter_mut().find_map(|entry| match entry {
            GroupEntry::Group(group) if group.name == name => Some(group),
            _ => None,
        })
    }

    /// Resolves a group by exact path: every segment must be a direct child
    /// of the previous one.
    pub fn descendant(&self, path: &str) -> Option<&ParameterGroup> {
        path.split(PATH_SEPARATOR)
            .try_fold(self, |group, name| group.child_group(name))
    }

    pub fn descendant_mut(&mut self, path: &str) -> Option<&mut ParameterGroup> {
        path.split(PATH_SEPARATOR)
            .try_fold(self, |group, name| group.child_group_mut(name))
    }

    fn subgroups(&self) -> impl Iterator<Item = &ParameterGroup> {
        self.entries.iter().filter_map(|entry| match entry {
            GroupEntry::Group(group) => Some(group),
            GroupEntry::Parameter(_) => None,
        })
    }

    /// Resolves a nested group by path; a bare name is searched recursively.
    pub fn group(&self, path: &str) -> Option<&ParameterGroup> {
        match path.split_once(PATH_SEPARATOR) {
            Some((first, rest)) => self.group(first)?.group(rest),
            None => self
                .subgroups()
                .find(|g| g.name == path)
                .or_else(|| self.subgroups().find_map(|g| g.group(path))),
        }
    }

    /// Mutable variant of [`ParameterGroup::group`].
    pub fn group_mut(&mut self, path: &str) -> Option<&mut ParameterGroup> {
        match path.split_once(PATH_SEPARATOR) {
            Some((first, rest)) => self.group_mut(first)?.group_mut(rest),
            None => {
                let direct = self
                    .entries
                    .iter()
                    .position(|e| matches!(e, GroupEntry::Group(g) if g.name == path));
                match direct {
                    Some(index) => match &mut self.entries[index] {
                        GroupEntry::Group(group) => Some(group),
                        GroupEntry::Parameter(_) => None,
                    },
                    None => self.entries.iter_mut().find_map(|entry| match entry {
                        GroupEntry::Group(group) => group.group_mut(path),
                        GroupEntry::Parameter(_) => None,
                    }),
                }
            }
        }
    }

    /// Every parameter in the tree, in display order.
    pub fn parameter_ids(&self) -> Vec<ParameterId> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, ids: &mut Vec<ParameterId>) {
        for entry in &self.entries {
            match entry {
                GroupEntry::Parameter(p) => ids.push(*p),
                GroupEntry::Group(group) => group.collect_ids(ids),
            }
        }
    }

    /// Parameters in the tree matching `predicate`.
    pub fn filter<F>(&self, arena: &ParameterArena, mut predicate: F) -> Vec<ParameterId>
    where
        F: FnMut(&crate::param::Parameter) -> bool,
    {
        self.parameter_ids()
            .into_iter()
            .filter(|id| arena.get(*id).is_some_and(&mut predicate))
            .collect()
    }

    /// Parameters with the given pin kind.
    pub fn parameters_with_pin(&self, arena: &ParameterArena, pin: PinKind) -> Vec<ParameterId> {
        self.filter(arena, |p| p.pin_kind() == pin)
    }

    /// Parameters that take part in at least one connection.
    pub fn connected_parameters(&self, arena: &ParameterArena) -> Vec<ParameterId> {
        self.filter(arena, |p| p.is_connected())
    }

    /// Path of a parameter relative to this group, e.g. `"Transform.Position"`.
    pub fn path_of(&self, id: ParameterId, arena: &ParameterArena) -> Option<String> {
        for entry in &self.entries {
            match entry {
                GroupEntry::Parameter(p) if *p == id => {
                    return arena.get(id).map(|p| p.name().to_string());
                }
                GroupEntry::Group(group) => {
                    if let Some(rest) = group.path_of(id, arena) {
                        return Some(format!("{}{}{}", group.name, PATH_SEPARATOR, rest));
                    }
                }
                GroupEntry::Parameter(_) => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;
    use crate::param::{Parameter, ParameterDefinition};

    fn arena_with(names: &[&str]) -> (ParameterArena, Vec<ParameterId>) {
        let mut arena = ParameterArena::with_key();
        let ids = names
            .iter()
            .map(|name| {
                arena.insert(Parameter::from_definition(
                    NodeId::default(),
                    ParameterDefinition::float(*name, 0.0),
                ))
            })
            .collect();
        (arena, ids)
    }

    fn sample_tree() -> (ParameterArena, Vec<ParameterId>, ParameterGroup) {
        let (arena, ids) = arena_with(&["Input", "Position", "Scale", "Output"]);
        let mut transform = ParameterGroup::new("Transform");
        transform.add_parameter(ids[1]);
        transform.add_parameter(ids[2]);
        let mut root = ParameterGroup::new("Parameters");
        root.add_parameter(ids[0]);
        root.add_group(transform);
        root.add_parameter(ids[3]);
        (arena, ids, root)
    }

    #[test]
    fn test_lookup_by_path() {
        let (arena, ids, root) = sample_tree();
        assert_eq!(root.parameter("Input", &arena), Some(ids[0]));
        assert_eq!(root.parameter("Transform.Scale", &arena), Some(ids[2]));
        assert_eq!(root.parameter("Transform.Missing", &arena), None);
        assert_eq!(root.parameter("Nope.Scale", &arena), None);
    }

    #[test]
    fn test_bare_name_searches_nested_groups() {
        let (arena, ids, root) = sample_tree();
        assert_eq!(root.parameter("Position", &arena), Some(ids[1]));
        assert!(root.group("Transform").is_some());
    }

    #[test]
    fn test_flatten_order() {
        let (_, ids, root) = sample_tree();
        assert_eq!(root.parameter_ids(), ids);
    }

    #[test]
    fn test_remove_parameter_recursive() {
        let (arena, ids, mut root) = sample_tree();
        assert!(root.remove_parameter(ids[2]));
        assert!(!root.contains(ids[2]));
        assert_eq!(root.parameter("Scale", &arena), None);
        assert!(!root.remove_parameter(ids[2]));
    }

    #[test]
    fn test_insert_relative() {
        let (mut arena, ids, mut root) = sample_tree();
        let rotate = arena.insert(Parameter::from_definition(
            NodeId::default(),
            ParameterDefinition::float("Rotate", 0.0),
        ));
        assert!(root.insert_parameter_after(rotate, ids[1]));
        assert_eq!(root.path_of(rotate, &arena).as_deref(), Some("Transform.Rotate"));
        assert_eq!(root.parameter_ids(), vec![ids[0], ids[1], rotate, ids[2], ids[3]]);
    }

    #[test]
    fn test_remove_group_and_names() {
        let (arena, _, mut root) = sample_tree();
        assert!(root.contains_name("Transform", &arena));
        assert!(root.contains_name("Output", &arena));
        let transform = root.remove_group("Transform").unwrap();
        assert_eq!(transform.len(), 2);
        assert!(!root.contains_name("Transform", &arena));
    }

    #[test]
    fn test_descendant_only_follows_direct_children() {
        let (_, _, mut root) = sample_tree();
        root.group_mut("Transform").unwrap().add_group(ParameterGroup::new("Pivot"));
        assert!(root.group("Pivot").is_some());
        assert!(root.descendant("Pivot").is_none());
        assert!(root.child_group("Pivot").is_none());
        assert_eq!(root.descendant("Transform.Pivot").map(|g| g.name()), Some("Pivot"));
        assert!(root.descendant_mut("Transform").is_some());
    }

    #[test]
    fn test_filter_by_pin() {
        let (arena, _, root) = sample_tree();
        assert!(root.parameters_with_pin(&arena, PinKind::Input).is_empty());
        assert_eq!(root.parameters_with_pin(&arena, PinKind::None).len(), 4);
        assert!(root.connected_parameters(&arena).is_empty());
    }
}
