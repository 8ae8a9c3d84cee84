//! The scope arena.

use crate::Instr;
use serde::Serialize;

/// Handle to a [`Scope`] in a [`Module`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ScopeId(pub u32);

/// A name bound in a scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    /// The final, unique name.
    pub name: String,
    /// The name as written in the source, or `None` for temporaries.
    pub original: Option<String>,
}

impl Binding {
    pub fn is_temp(&self) -> bool {
        self.original.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    /// Bindings in declaration order.
    pub names: Vec<Binding>,
    pub body: Vec<Instr>,
}

/// A lowered module. The top level is `scopes[root]`; every function body is another
/// scope whose parent chain leads back to the root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    pub name: String,
    pub path: String,
    pub root: ScopeId,
    pub scopes: Vec<Scope>,
}

impl Module {
    /// Creates a module with an empty root scope.
    pub fn new(name: String, path: String) -> Self {
        Self {
            name,
            path,
            root: ScopeId(0),
            scopes: vec![Scope::default()],
        }
    }

    /// Allocates a new empty scope.
    pub fn add_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent,
            ..Scope::default()
        });
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    /// Iterates over `id` and its ancestors, innermost first.
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(id), move |id| self.scope(*id).parent)
    }

    /// Finds the binding with the final name `name`, walking up from `id`.
    pub fn lookup(&self, id: ScopeId, name: &str) -> Option<&Binding> {
        self.ancestors(id)
            .flat_map(|id| self.scope(id).names.iter())
            .find(|binding| binding.name == name)
    }

    /// Finds the newest binding of the source name `original` visible from `id`.
    pub fn lookup_original(&self, id: ScopeId, original: &str) -> Option<&Binding> {
        self.ancestors(id)
            .flat_map(|id| self.scope(id).names.iter().rev())
            .find(|binding| binding.original.as_deref() == Some(original))
    }

    /// Returns the root scope's instructions.
    pub fn body(&self) -> &[Instr] {
        &self.scope(self.root).body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(name: &str, original: Option<&str>) -> Binding {
        Binding {
            name: name.to_string(),
            original: original.map(str::to_string),
        }
    }

    #[test]
    fn test_lookup_walks_parents() {
        let mut module = Module::new("main".to_string(), "<input>".to_string());
        let root = module.root;
        module.scope_mut(root).names.push(binding("x", Some("x")));
        module.scope_mut(root).names.push(binding("x_1", Some("x")));

        let child = module.add_scope(Some(root));
        module.scope_mut(child).names.push(binding("$1", None));

        assert_eq!(module.ancestors(child).collect::<Vec<_>>(), vec![child, root]);
        assert_eq!(module.lookup(child, "x").map(|b| b.name.as_str()), Some("x"));
        assert!(module.lookup(root, "$1").is_none());
        assert_eq!(
            module.lookup_original(child, "x").map(|b| b.name.as_str()),
            Some("x_1")
        );
        assert!(module.lookup_original(child, "$1").is_none());
        assert!(module.scope(child).names[0].is_temp());
    }
}
