//! Scripted executor for tests.
//!
//! [`RecordingExecutor`] records every statement it receives and answers from
//! a queue of [`Response`]s. When the queue is empty each call gets a neutral
//! answer: no row, no rows, a count of zero, one affected row, and insert ids
//! counting up from 1.

use crate::executor::{DbError, Executor};
use crate::model::Statement;
use crate::value::{Params, RawMap};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Queued answer for the next executor call
#[derive(Debug, Clone)]
pub enum Response {
    Row(Option<RawMap>),
    Rows(Vec<RawMap>),
    Count(u64),
    Id(i64),
    Affected(u64),
    Fail(DbError),
}

/// Executor that records statements and replays queued responses
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    statements: Mutex<Vec<Statement>>,
    responses: Mutex<VecDeque<Response>>,
    errors: Mutex<Vec<DbError>>,
    next_id: Mutex<i64>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a later call
    pub fn respond(&self, response: Response) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Queue a failure for the next call
    pub fn fail_next(&self, error: DbError) -> &Self {
        self.respond(Response::Fail(error))
    }

    /// Statements received so far, oldest first
    pub fn statements(&self) -> Vec<Statement> {
        self.statements.lock().unwrap().clone()
    }

    /// SQL text of the statements received so far
    pub fn sql(&self) -> Vec<String> {
        self.statements().into_iter().map(|s| s.sql).collect()
    }

    /// Most recent statement, if any
    pub fn last(&self) -> Option<Statement> {
        self.statements.lock().unwrap().last().cloned()
    }

    pub fn clear(&self) {
        self.statements.lock().unwrap().clear();
        self.responses.lock().unwrap().clear();
        self.errors.lock().unwrap().clear();
    }

    fn record(&self, sql: &str, params: &Params) -> Option<Response> {
        self.statements
            .lock()
            .unwrap()
            .push(Statement::new(sql, params.clone()));
        let response = self.responses.lock().unwrap().pop_front();
        if let Some(Response::Fail(err)) = &response {
            self.errors.lock().unwrap().push(err.clone());
        }
        response
    }
}

fn unexpected(call: &str, response: &Response) -> DbError {
    DbError::QueryError(format!("{call}: unexpected scripted response {response:?}"))
}

impl Executor for RecordingExecutor {
    fn query_one(&self, sql: &str, params: &Params) -> Result<Option<RawMap>, DbError> {
        match self.record(sql, params) {
            None => Ok(None),
            Some(Response::Row(row)) => Ok(row),
            Some(Response::Rows(rows)) => Ok(rows.into_iter().next()),
            Some(Response::Fail(err)) => Err(err),
            Some(other) => Err(unexpected("query_one", &other)),
        }
    }

    fn query_all(&self, sql: &str, params: &Params) -> Result<Vec<RawMap>, DbError> {
        match self.record(sql, params) {
            None => Ok(Vec::new()),
            Some(Response::Rows(rows)) => Ok(rows),
            Some(Response::Row(row)) => Ok(row.into_iter().collect()),
            Some(Response::Fail(err)) => Err(err),
            Some(other) => Err(unexpected("query_all", &other)),
        }
    }

    fn count(&self, sql: &str, params: &Params) -> Result<u64, DbError> {
        match self.record(sql, params) {
            None => Ok(0),
            Some(Response::Count(n)) => Ok(n),
            Some(Response::Fail(err)) => Err(err),
            Some(other) => Err(unexpected("count", &other)),
        }
    }

    fn insert(&self, sql: &str, params: &Params) -> Result<i64, DbError> {
        let mut next_id = self.next_id.lock().unwrap();
        match self.record(sql, params) {
            None => {
                *next_id += 1;
                Ok(*next_id)
            }
            Some(Response::Id(id)) => {
                *next_id = id;
                Ok(id)
            }
            Some(Response::Fail(err)) => Err(err),
            Some(other) => Err(unexpected("insert", &other)),
        }
    }

    fn execute(&self, sql: &str, params: &Params) -> Result<u64, DbError> {
        match self.record(sql, params) {
            None => Ok(1),
            Some(Response::Affected(n)) => Ok(n),
            Some(Response::Fail(err)) => Err(err),
            Some(other) => Err(unexpected("execute", &other)),
        }
    }

    fn errors(&self) -> Vec<DbError> {
        self.errors.lock().unwrap().clone()
    }
}
