use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use super::{AddressSuggestion, Geocoder};

/// Inputs this short never reach the geocoder.
pub const MIN_QUERY_CHARS: usize = 2;

/// Debounced autocomplete for a single address field.
///
/// Each keystroke cancels the lookup scheduled by the previous one, so only the
/// last input in a burst is sent once the debounce window passes. Results are
/// published on a watch channel.
pub struct AutocompleteSession<G: Geocoder + ?Sized + 'static> {
    geocoder: Arc<G>,
    debounce: Duration,
    pending: Option<JoinHandle<()>>,
    suggestions: Arc<watch::Sender<Vec<AddressSuggestion>>>,
}

impl<G: Geocoder + ?Sized + 'static> AutocompleteSession<G> {
    pub fn new(geocoder: Arc<G>, debounce: Duration) -> Self {
        let (sender, _) = watch::channel(Vec::new());
        Self {
            geocoder,
            debounce,
            pending: None,
            suggestions: Arc::new(sender),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<AddressSuggestion>> {
        self.suggestions.subscribe()
    }

    pub fn suggestions(&self) -> Vec<AddressSuggestion> {
        self.suggestions.borrow().clone()
    }

    pub fn input(&mut self, text: &str) {
        self.cancel_pending();

        if text.chars().count() <= MIN_QUERY_CHARS {
            self.suggestions.send_replace(Vec::new());
            return;
        }

        let geocoder = Arc::clone(&self.geocoder);
        let suggestions = Arc::clone(&self.suggestions);
        let debounce = self.debounce;
        let query = text.to_string();

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            match geocoder.autocomplete(&query).await {
                Ok(found) => {
                    suggestions.send_replace(found);
                }
                Err(err) => {
                    warn!(%query, error = %err, "address autocomplete failed");
                    suggestions.send_replace(Vec::new());
                }
            }
        }));
    }

    /// Accepts a suggestion and clears the list.
    pub fn select(&mut self, suggestion: &AddressSuggestion) -> AddressSuggestion {
        self.cancel_pending();
        self.suggestions.send_replace(Vec::new());
        suggestion.clone()
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<G: Geocoder + ?Sized + 'static> Drop for AutocompleteSession<G> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
