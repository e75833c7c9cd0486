use crate::lexer::Position;
use crate::parser::NodeId;
use std::collections::HashMap;
use std::fmt;

/// Type classification attached to symbols and terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Numeric,
    Boolean,
    /// Operator class of `eq` and `>`; never the type of a value
    Comparison,
    /// Procedure and function names
    Typeless,
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            VarType::Numeric => "numeric",
            VarType::Boolean => "boolean",
            VarType::Comparison => "comparison",
            VarType::Typeless => "typeless",
        };
        write!(f, "{s}")
    }
}

/// Subroutine owning a parameter or local variable
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    Procedure(String),
    Function(String),
}

impl Owner {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Owner::Procedure(name) | Owner::Function(name) => name,
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Owner::Procedure(name) => write!(f, "procedure '{name}'"),
            Owner::Function(name) => write!(f, "function '{name}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalRole {
    Parameter,
    Declared,
}

/// Where a variable was declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolScope {
    Global,
    Main,
    Local { owner: Owner, role: LocalRole },
}

/// Symbol information
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub id: NodeId,
    pub name: String,
    pub scope: SymbolScope,
    pub var_type: VarType,
    pub internal_name: Option<String>,
    pub pos: Position,
}

impl Symbol {
    #[must_use]
    pub fn owner(&self) -> Option<&Owner> {
        match &self.scope {
            SymbolScope::Local { owner, .. } => Some(owner),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_parameter(&self) -> bool {
        matches!(self.scope, SymbolScope::Local { role: LocalRole::Parameter, .. })
    }

    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self.scope, SymbolScope::Local { role: LocalRole::Declared, .. })
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        self.scope == SymbolScope::Global
    }

    #[must_use]
    pub fn is_main_var(&self) -> bool {
        self.scope == SymbolScope::Main
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineKind {
    Procedure,
    Function,
}

impl fmt::Display for SubroutineKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SubroutineKind::Procedure => write!(f, "procedure"),
            SubroutineKind::Function => write!(f, "function"),
        }
    }
}

/// Procedure or function symbol
#[derive(Debug, Clone, PartialEq)]
pub struct Subroutine {
    pub id: NodeId,
    pub name: String,
    pub kind: SubroutineKind,
    /// Always `Typeless`: subroutine names carry no value
    pub var_type: VarType,
    pub arity: usize,
    pub pos: Position,
}

/// The reachable-scope chain a variable occurrence is looked up in
#[derive(Debug, Clone, Copy)]
pub enum Lookup<'a> {
    Main,
    Local(&'a Owner),
}

/// Symbol arena indexed by node id, with a name index for lookups.
/// Entries are never removed.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: Vec<Option<Symbol>>,
    by_name: HashMap<String, Vec<NodeId>>,
    subroutines: HashMap<String, Subroutine>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol under its node id
    /// # Errors
    /// If an entry already occupies that id
    pub fn insert(&mut self, symbol: Symbol) -> Result<(), String> {
        let id = symbol.id;
        if self.entries.len() <= id {
            self.entries.resize(id + 1, None);
        }
        if self.entries[id].is_some() {
            return Err(format!("Symbol id {id} is already taken"));
        }

        self.by_name.entry(symbol.name.clone()).or_default().push(id);
        self.entries[id] = Some(symbol);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Symbol> {
        self.entries.get(id).and_then(Option::as_ref)
    }

    /// Record a type attribute on an existing entry
    pub fn set_type(&mut self, id: NodeId, var_type: VarType) -> bool {
        match self.entries.get_mut(id).and_then(Option::as_mut) {
            Some(symbol) => {
                symbol.var_type = var_type;
                true
            }
            None => false,
        }
    }

    /// All entries carrying a name, in declaration order
    pub fn by_name<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Symbol> + 'a {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|id| self.get(*id))
    }

    /// Resolve a variable through the reachable-scope chain.
    ///
    /// Local code sees its own parameters, then its own locals, then globals.
    /// Main sees main variables, then globals.
    #[must_use]
    pub fn resolve(&self, name: &str, lookup: Lookup<'_>) -> Option<&Symbol> {
        match lookup {
            Lookup::Local(owner) => self
                .find(name, |s| s.is_parameter() && s.owner() == Some(owner))
                .or_else(|| self.find(name, |s| s.is_local() && s.owner() == Some(owner)))
                .or_else(|| self.find(name, Symbol::is_global)),
            Lookup::Main => self
                .find(name, Symbol::is_main_var)
                .or_else(|| self.find(name, Symbol::is_global)),
        }
    }

    fn find(&self, name: &str, pred: impl Fn(&Symbol) -> bool) -> Option<&Symbol> {
        self.by_name(name).find(|s| pred(s))
    }

    /// Iterate all entries in id order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.iter().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a procedure or function; the first declaration of a name wins
    pub fn add_subroutine(&mut self, subroutine: Subroutine) -> bool {
        if self.subroutines.contains_key(&subroutine.name) {
            return false;
        }
        self.subroutines.insert(subroutine.name.clone(), subroutine);
        true
    }

    #[must_use]
    pub fn subroutine(&self, name: &str) -> Option<&Subroutine> {
        self.subroutines.get(name)
    }
}
