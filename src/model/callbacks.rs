//! Named before/after callbacks around create, update and delete.
//!
//! A before callback sees the statement about to run and may return a
//! replacement; returning `Ok(None)` keeps the current one. An after callback
//! sees the generated id (create only) and the parameters, and may return
//! replacement parameters for the callbacks after it.
//!
//! Callbacks run in registration order. Registering a name that already exists
//! replaces that callback in place.
//!
//! Errors returned by callbacks are passed to the caller untouched as
//! [`ModelError::Callback`](super::ModelError::Callback); they are not
//! recorded in the model's report.
//!
//! A registry is a plain value owned by whoever builds the models. Cloning it
//! is cheap, so one set of callbacks can be handed to several models. It has no
//! internal locking: mutate it between operations, not during them.

use super::statement::Statement;
use crate::value::Params;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Error type callbacks may fail with
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Callback run before a statement executes
pub type BeforeCallback =
    Arc<dyn Fn(&Statement) -> Result<Option<Statement>, CallbackError> + Send + Sync>;

/// Callback run after a statement executed
pub type AfterCallback =
    Arc<dyn Fn(Option<i64>, &Params) -> Result<Option<Params>, CallbackError> + Send + Sync>;

/// Operation a callback is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Create,
    Update,
    Delete,
}

/// Callback registry
#[derive(Clone, Default)]
pub struct Callbacks {
    before: HashMap<Stage, Vec<(String, BeforeCallback)>>,
    after: HashMap<Stage, Vec<(String, AfterCallback)>>,
}

fn upsert<C>(chain: &mut Vec<(String, C)>, name: String, callback: C) {
    match chain.iter_mut().find(|(n, _)| *n == name) {
        Some(slot) => slot.1 = callback,
        None => chain.push((name, callback)),
    }
}

fn remove<C>(chain: Option<&mut Vec<(String, C)>>, name: &str) -> bool {
    let Some(chain) = chain else {
        return false;
    };
    let before = chain.len();
    chain.retain(|(n, _)| n != name);
    chain.len() != before
}

macro_rules! stage_callbacks {
    ($stage:expr, $add_before:ident, $remove_before:ident, $add_after:ident, $remove_after:ident) => {
        pub fn $add_before<F>(&mut self, name: impl Into<String>, callback: F) -> &mut Self
        where
            F: Fn(&Statement) -> Result<Option<Statement>, CallbackError> + Send + Sync + 'static,
        {
            self.add_before($stage, name, callback)
        }

        pub fn $remove_before(&mut self, name: &str) -> bool {
            self.remove_before($stage, name)
        }

        pub fn $add_after<F>(&mut self, name: impl Into<String>, callback: F) -> &mut Self
        where
            F: Fn(Option<i64>, &Params) -> Result<Option<Params>, CallbackError>
                + Send
                + Sync
                + 'static,
        {
            self.add_after($stage, name, callback)
        }

        pub fn $remove_after(&mut self, name: &str) -> bool {
            self.remove_after($stage, name)
        }
    };
}

impl Callbacks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a before callback under `name`
    pub fn add_before<F>(&mut self, stage: Stage, name: impl Into<String>, callback: F) -> &mut Self
    where
        F: Fn(&Statement) -> Result<Option<Statement>, CallbackError> + Send + Sync + 'static,
    {
        upsert(
            self.before.entry(stage).or_default(),
            name.into(),
            Arc::new(callback) as BeforeCallback,
        );
        self
    }

    /// Register an after callback under `name`
    pub fn add_after<F>(&mut self, stage: Stage, name: impl Into<String>, callback: F) -> &mut Self
    where
        F: Fn(Option<i64>, &Params) -> Result<Option<Params>, CallbackError> + Send + Sync + 'static,
    {
        upsert(
            self.after.entry(stage).or_default(),
            name.into(),
            Arc::new(callback) as AfterCallback,
        );
        self
    }

    /// Remove a before callback; returns whether one was registered
    pub fn remove_before(&mut self, stage: Stage, name: &str) -> bool {
        remove(self.before.get_mut(&stage), name)
    }

    /// Remove an after callback; returns whether one was registered
    pub fn remove_after(&mut self, stage: Stage, name: &str) -> bool {
        remove(self.after.get_mut(&stage), name)
    }

    stage_callbacks!(
        Stage::Create,
        add_before_create,
        remove_before_create,
        add_after_create,
        remove_after_create
    );
    stage_callbacks!(
        Stage::Update,
        add_before_update,
        remove_before_update,
        add_after_update,
        remove_after_update
    );
    stage_callbacks!(
        Stage::Delete,
        add_before_delete,
        remove_before_delete,
        add_after_delete,
        remove_after_delete
    );

    /// Names of the before callbacks of a stage, in run order
    #[must_use]
    pub fn before_names(&self, stage: Stage) -> Vec<&str> {
        self.before
            .get(&stage)
            .map(|chain| chain.iter().map(|(n, _)| n.as_str()).collect())
            .unwrap_or_default()
    }

    /// Names of the after callbacks of a stage, in run order
    #[must_use]
    pub fn after_names(&self, stage: Stage) -> Vec<&str> {
        self.after
            .get(&stage)
            .map(|chain| chain.iter().map(|(n, _)| n.as_str()).collect())
            .unwrap_or_default()
    }

    /// Thread a statement through the before chain of a stage
    ///
    /// # Errors
    ///
    /// Stops at, and returns, the first callback error.
    pub fn run_before(&self, stage: Stage, statement: Statement) -> Result<Statement, CallbackError> {
        let mut current = statement;
        for (name, callback) in self.before.get(&stage).into_iter().flatten() {
            if let Some(replacement) = callback(&current)? {
                log::debug!("before {stage:?} callback {name} rewrote the statement");
                current = replacement;
            }
        }
        Ok(current)
    }

    /// Thread parameters through the after chain of a stage
    ///
    /// # Errors
    ///
    /// Stops at, and returns, the first callback error.
    pub fn run_after(
        &self,
        stage: Stage,
        output: Option<i64>,
        params: Params,
    ) -> Result<Params, CallbackError> {
        let mut current = params;
        for (_, callback) in self.after.get(&stage).into_iter().flatten() {
            if let Some(replacement) = callback(output, &current)? {
                current = replacement;
            }
        }
        Ok(current)
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Callbacks");
        for stage in [Stage::Create, Stage::Update, Stage::Delete] {
            debug.field(&format!("before_{stage:?}"), &self.before_names(stage));
            debug.field(&format!("after_{stage:?}"), &self.after_names(stage));
        }
        debug.finish()
    }
}
