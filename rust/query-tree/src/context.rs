use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::errors::Diagnostic;
use crate::position::{InflatedPos, Pos};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// State shared by all nodes of one parse.
///
/// Nodes only hold a weak reference to it; the parser driver owns the
/// context for as long as the tree needs position and diagnostic services.
#[derive(Debug)]
pub struct ParserContext {
    id: u64,
    source: Option<Arc<str>>,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl ParserContext {
    pub fn new() -> Arc<ParserContext> {
        Arc::new(ParserContext::create(None))
    }

    /// Context for parsing `source`, so that node spans can be turned into
    /// line and column numbers.
    pub fn with_source(source: impl Into<Arc<str>>) -> Arc<ParserContext> {
        Arc::new(ParserContext::create(Some(source.into())))
    }

    fn create(source: Option<Arc<str>>) -> ParserContext {
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        trace!("new parser context {id}");
        ParserContext {
            id,
            source,
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn position(&self, offset: u64) -> Option<Pos> {
        let source = self.source.as_deref()?;
        match InflatedPos::from_offset(source.as_bytes(), offset) {
            Ok(pos) => Some(pos.deflate()),
            Err(e) => {
                debug!("context {}: cannot inflate offset {offset}: {e}", self.id);
                None
            }
        }
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        trace!("context {}: {diagnostic}", self.id);
        self.lock().push(diagnostic);
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
