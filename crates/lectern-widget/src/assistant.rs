//! Page-level coordinator wiring selection capture to chat windows.

use std::sync::{Arc, Mutex};

use lectern_agent::AgentClient;
use lectern_identity::IdentityAccessor;
use lectern_select::{Intent, MenuAnchor, Selection, SelectionCapture, Viewport};

use crate::window::ChatWindow;

/// Line shown in place of an empty transcript.
pub const WELCOME_MESSAGE: &str =
    "Hello! I'm your AI assistant. How can I help you with this book?";

/// Coordinates the assistant on one documentation page.
///
/// Owns the selection capture and at most one open chat window. Selection
/// capture is enabled only while the identity is authenticated; that policy
/// lives here, at the boundary, not inside capture itself. Committed
/// selection intents go to the open window when there is one and otherwise
/// open a new window carrying the intent.
pub struct DocsAssistant {
    client: AgentClient,
    identity: Arc<dyn IdentityAccessor>,
    capture: Mutex<SelectionCapture>,
    window: Mutex<Option<Arc<ChatWindow>>>,
    current_page: Mutex<Option<String>>,
}

impl DocsAssistant {
    /// Builds the coordinator with selection capture disabled until an
    /// authenticated identity is reported.
    pub fn new(client: AgentClient, identity: Arc<dyn IdentityAccessor>) -> Self {
        Self {
            client,
            identity,
            capture: Mutex::new(SelectionCapture::new(false)),
            window: Mutex::new(None),
            current_page: Mutex::new(None),
        }
    }

    /// Applies the authentication policy: capture runs only for
    /// authenticated identities. Revoking also drops any pending candidate.
    pub fn set_authenticated(&self, authenticated: bool) {
        match self.capture.lock() {
            Ok(mut capture) => {
                capture.set_enabled(authenticated);
                tracing::debug!(enabled = authenticated, "Selection capture toggled");
            }
            Err(e) => tracing::error!("Capture lock poisoned: {}", e),
        }
    }

    pub fn is_selection_enabled(&self) -> bool {
        self.capture
            .lock()
            .map(|capture| capture.is_enabled())
            .unwrap_or(false)
    }

    /// Records the page the reader is on; attached to every dispatch.
    pub fn set_current_page(&self, page: Option<String>) {
        match self.current_page.lock() {
            Ok(mut current) => *current = page,
            Err(e) => tracing::error!("Page lock poisoned: {}", e),
        }
    }

    // -- Selection plumbing --

    /// Forwards one selection release to capture, yielding the menu anchor
    /// when a candidate was registered.
    pub fn handle_selection_release(
        &self,
        selection: Selection,
        viewport: Viewport,
    ) -> Option<MenuAnchor> {
        match self.capture.lock() {
            Ok(mut capture) => capture.on_selection_release(selection, viewport),
            Err(e) => {
                tracing::error!("Capture lock poisoned: {}", e);
                None
            }
        }
    }

    pub fn has_pending_selection(&self) -> bool {
        self.capture
            .lock()
            .map(|capture| capture.has_pending())
            .unwrap_or(false)
    }

    /// Dismisses the contextual menu without committing.
    pub fn dismiss_menu(&self) {
        if let Ok(mut capture) = self.capture.lock() {
            capture.clear();
        }
    }

    /// Commits the pending selection as an ask intent, returning the window
    /// it was applied to. `None` when no candidate is pending.
    pub async fn ask_selection(&self) -> Option<Arc<ChatWindow>> {
        let intent = self.take_intent(SelectionCapture::ask)?;
        Some(self.commit(intent).await)
    }

    /// Commits the pending selection as a summarize intent, returning the
    /// window it was applied to. `None` when no candidate is pending.
    pub async fn summarize_selection(&self) -> Option<Arc<ChatWindow>> {
        let intent = self.take_intent(SelectionCapture::summarize)?;
        Some(self.commit(intent).await)
    }

    // -- Window lifecycle --

    /// Opens a chat window, closing any previous one first.
    pub async fn open_window(&self, resume_id: Option<&str>) -> Arc<ChatWindow> {
        self.close_window();
        let window = Arc::new(
            ChatWindow::open(
                self.client.clone(),
                Arc::clone(&self.identity),
                resume_id,
                None,
                self.page(),
            )
            .await,
        );
        self.store_window(Arc::clone(&window));
        window
    }

    /// Closes and drops the open window, if any.
    pub fn close_window(&self) {
        let previous = match self.window.lock() {
            Ok(mut slot) => slot.take(),
            Err(e) => {
                tracing::error!("Window lock poisoned: {}", e);
                None
            }
        };
        if let Some(window) = previous {
            window.close();
        }
    }

    pub fn window(&self) -> Option<Arc<ChatWindow>> {
        self.window
            .lock()
            .map(|slot| slot.as_ref().map(Arc::clone))
            .unwrap_or(None)
    }

    // -- Private helpers --

    fn take_intent(&self, commit: fn(&mut SelectionCapture) -> Option<Intent>) -> Option<Intent> {
        match self.capture.lock() {
            Ok(mut capture) => commit(&mut capture),
            Err(e) => {
                tracing::error!("Capture lock poisoned: {}", e);
                None
            }
        }
    }

    /// Applies the intent to the open window, opening one when needed.
    async fn commit(&self, intent: Intent) -> Arc<ChatWindow> {
        let page = self.page();
        match self.window() {
            Some(window) if !window.is_closed() => {
                window.apply_intent(intent, page).await;
                window
            }
            _ => {
                let window = Arc::new(
                    ChatWindow::open(
                        self.client.clone(),
                        Arc::clone(&self.identity),
                        None,
                        Some(intent),
                        page,
                    )
                    .await,
                );
                self.store_window(Arc::clone(&window));
                window
            }
        }
    }

    fn store_window(&self, window: Arc<ChatWindow>) {
        match self.window.lock() {
            Ok(mut slot) => *slot = Some(window),
            Err(e) => tracing::error!("Window lock poisoned: {}", e),
        }
    }

    fn page(&self) -> Option<String> {
        self.current_page
            .lock()
            .map(|current| current.clone())
            .unwrap_or_default()
    }
}

// =============================================================================
// Tests
// =============================================================================
