use crate::analysis::{SemanticError, Warning};
use crate::lexer::Position;
use crate::parser::NodeId;
use crate::symbol::{Lookup, Owner, Symbol, SymbolScope, SymbolTable, VarType};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Global variables, procedures and functions
    Everywhere,
    Main,
    Local,
}

/// Traversal bookkeeping for one open scope. Popping a frame never removes
/// the symbol entries it recorded.
#[derive(Debug, Clone)]
pub struct ScopeFrame {
    pub kind: ScopeKind,
    pub owner: Option<Owner>,
    pub members: Vec<NodeId>,
}

/// State shared by every phase of one compilation
#[derive(Debug)]
pub struct Context {
    next_node_id: NodeId,
    temp_counter: usize,
    label_counter: usize,
    symbols: SymbolTable,
    scopes: Vec<ScopeFrame>,
    resolutions: HashMap<NodeId, NodeId>,
    errors: Vec<SemanticError>,
    warnings: Vec<Warning>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_node_id: 1,
            temp_counter: 0,
            label_counter: 0,
            symbols: SymbolTable::new(),
            scopes: Vec::new(),
            resolutions: HashMap::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Hand out a fresh node id; ids are never reused
    pub fn next_node_id(&mut self) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        id
    }

    pub fn new_temp(&mut self) -> String {
        self.temp_counter += 1;
        format!("_t{}", self.temp_counter)
    }

    pub fn new_label(&mut self) -> String {
        self.label_counter += 1;
        format!("_L{}", self.label_counter)
    }

    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn push_scope(&mut self, kind: ScopeKind, owner: Option<Owner>) {
        tracing::trace!(?kind, ?owner, depth = self.scopes.len(), "push scope");
        self.scopes.push(ScopeFrame {
            kind,
            owner,
            members: Vec::new(),
        });
    }

    pub fn pop_scope(&mut self) -> Option<ScopeFrame> {
        let frame = self.scopes.pop()?;
        tracing::trace!(
            kind = ?frame.kind,
            owner = ?frame.owner,
            members = frame.members.len(),
            depth = self.scopes.len(),
            "pop scope"
        );
        Some(frame)
    }

    #[must_use]
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Create a symbol entry with a fresh id and record it in the open frame.
    /// Parameters and locals get an owner-prefixed internal name.
    pub fn declare(&mut self, name: &str, scope: SymbolScope, pos: Position) -> NodeId {
        let id = self.next_node_id();
        let internal_name = match &scope {
            SymbolScope::Local { owner, .. } => Some(format!("{}_{name}", owner.name())),
            SymbolScope::Global | SymbolScope::Main => None,
        };

        let symbol = Symbol {
            id,
            name: name.to_string(),
            scope,
            var_type: VarType::Numeric,
            internal_name,
            pos,
        };

        // Fresh ids cannot collide
        if let Err(e) = self.symbols.insert(symbol) {
            tracing::error!("{e}");
        }
        if let Some(frame) = self.scopes.last_mut() {
            frame.members.push(id);
        }
        id
    }

    /// Resolve a variable occurrence and remember which entry it refers to
    pub fn resolve_use(&mut self, use_id: NodeId, name: &str, lookup: Lookup<'_>) -> Option<NodeId> {
        let decl = self.symbols.resolve(name, lookup)?.id;
        self.resolutions.insert(use_id, decl);
        Some(decl)
    }

    /// The declaring entry of a resolved variable occurrence
    #[must_use]
    pub fn resolution(&self, use_id: NodeId) -> Option<&Symbol> {
        self.resolutions
            .get(&use_id)
            .and_then(|decl| self.symbols.get(*decl))
    }

    pub fn add_error(&mut self, error: impl Into<SemanticError>) {
        let error = error.into();
        tracing::debug!(%error, "semantic error");
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: Warning) {
        tracing::debug!(%warning, "warning");
        self.warnings.push(warning);
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[SemanticError] {
        &self.errors
    }

    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}
