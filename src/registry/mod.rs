//! Command registry: named functions and their key bindings
//!
//! Two views over one table: functions in registration order (their index
//! is the stable command id) with a name-sorted index for lookup and
//! completion, and bindings sorted by key sequence for incremental
//! matching. A binding points back at its function; a function can carry
//! any number of bindings.

use crate::error::Result;

pub type CommandId = usize;

/// Context handed to every command invocation
#[derive(Debug, Clone, Copy)]
pub struct CommandCtx {
    pub pane: crate::pane::PaneId,
    pub prefix: crate::dispatch::Prefix,
    pub id: CommandId,
}

pub type CommandFn<C> = fn(&mut C, &CommandCtx) -> Result<()>;

pub struct FuncEntry<C> {
    pub name: &'static str,
    pub run: CommandFn<C>,
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub seq: Vec<u8>,
    pub func: CommandId,
}

/// Result of matching an in-progress key sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// A binding matched exactly
    Full(CommandId),
    /// At least one binding extends the sequence
    Partial,
    /// No binding can match
    Undefined,
}

pub struct Registry<C> {
    funcs: Vec<FuncEntry<C>>,
    /// Indices into `funcs`, sorted by name
    by_name: Vec<usize>,
    /// Sorted by key sequence
    bindings: Vec<Binding>,
}

impl<C> Registry<C> {
    pub fn new() -> Self {
        Registry {
            funcs: Vec::new(),
            by_name: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Register a function with its bindings; returns its command id
    pub fn register(
        &mut self,
        name: &'static str,
        run: CommandFn<C>,
        seqs: &[Vec<u8>],
    ) -> CommandId {
        let id = self.funcs.len();
        self.funcs.push(FuncEntry { name, run });

        let at = self
            .by_name
            .binary_search_by(|&i| self.funcs[i].name.cmp(name))
            .unwrap_or_else(|e| e);
        self.by_name.insert(at, id);

        for seq in seqs {
            let at = self
                .bindings
                .binary_search_by(|b| b.seq.as_slice().cmp(seq.as_slice()))
                .unwrap_or_else(|e| e);
            self.bindings.insert(at, Binding { seq: seq.clone(), func: id });
        }
        id
    }

    #[must_use]
    pub fn name_of(&self, id: CommandId) -> &'static str {
        self.funcs[id].name
    }

    #[must_use]
    pub fn run_of(&self, id: CommandId) -> CommandFn<C> {
        self.funcs[id].run
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    /// Look up a command by exact name
    #[must_use]
    pub fn find(&self, name: &str) -> Option<CommandId> {
        self.by_name
            .binary_search_by(|&i| self.funcs[i].name.cmp(name))
            .ok()
            .map(|at| self.by_name[at])
    }

    /// Names in sorted order, for the command pop-up list
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_name.iter().map(move |&i| self.funcs[i].name)
    }

    /// Longest unambiguous completion of a command-name prefix
    #[must_use]
    pub fn complete(&self, prefix: &str) -> Option<String> {
        let matches: Vec<&str> = self
            .names()
            .filter(|name| name.starts_with(prefix))
            .collect();
        let first = matches.first()?;
        let mut common = first.len();
        for name in &matches[1..] {
            common = common.min(
                first
                    .bytes()
                    .zip(name.bytes())
                    .take_while(|(a, b)| a == b)
                    .count(),
            );
        }
        Some(first[..common].to_string())
    }

    /// Bindings of a function, for display
    pub fn bindings_of(&self, id: CommandId) -> impl Iterator<Item = &Binding> + '_ {
        self.bindings.iter().filter(move |b| b.func == id)
    }

    /// Incremental three-valued match of an in-progress sequence against
    /// the sorted binding list
    #[must_use]
    pub fn match_seq(&self, seq: &[u8]) -> MatchResult {
        let mut partial = false;
        for binding in &self.bindings {
            if binding.seq.as_slice() == seq {
                return MatchResult::Full(binding.func);
            }
            if binding.seq.len() > seq.len() && binding.seq.starts_with(seq) {
                partial = true;
            } else if binding.seq.as_slice() > seq && !binding.seq.starts_with(seq) {
                // Sorted order: nothing later can match either
                break;
            }
        }
        if partial {
            MatchResult::Partial
        } else {
            MatchResult::Undefined
        }
    }
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
