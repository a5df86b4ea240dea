//! Document head scripts.
//!
//! Segments that publish structured data inject a JSON-LD script keyed by a
//! feature id. Injecting the same id again replaces the earlier script, and
//! the returned guard removes its script when dropped unless a newer
//! injection has taken its place.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

/// Script id for FAQ page structured data.
pub const FAQ_SCRIPT_ID: &str = "faq-structured-data";
/// Script id for product structured data.
pub const PRODUCT_SCRIPT_ID: &str = "product-structured-data";

#[derive(Debug)]
struct HeadScript {
    generation: u64,
    json: String,
}

/// Head of the document being rendered.
#[derive(Debug, Default)]
pub struct DocumentHead {
    scripts: Mutex<BTreeMap<String, HeadScript>>,
    generation: AtomicU64,
}

impl DocumentHead {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn scripts(&self) -> MutexGuard<'_, BTreeMap<String, HeadScript>> {
        self.scripts.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert or replace the JSON-LD script `id`.
    pub fn inject(self: &Arc<Self>, id: &str, data: &Value) -> HeadScriptGuard {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.scripts().insert(
            id.to_string(),
            HeadScript {
                generation,
                json: data.to_string(),
            },
        );
        HeadScriptGuard {
            head: Arc::clone(self),
            id: id.to_string(),
            generation,
        }
    }

    /// Whether a script with this id is present.
    pub fn contains(&self, id: &str) -> bool {
        self.scripts().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.scripts().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render all scripts as HTML.
    pub fn render(&self) -> String {
        self.scripts()
            .iter()
            .map(|(id, script)| {
                format!(
                    r#"<script type="application/ld+json" id="{}">{}</script>"#,
                    crate::utils::html_escape(id),
                    crate::utils::escape_script_json(&script.json)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Keeps an injected script alive. Dropping it removes the script unless it
/// was replaced by a newer injection.
#[derive(Debug)]
#[must_use = "the script is removed when the guard is dropped"]
pub struct HeadScriptGuard {
    head: Arc<DocumentHead>,
    id: String,
    generation: u64,
}

impl HeadScriptGuard {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for HeadScriptGuard {
    fn drop(&mut self) {
        let mut scripts = self.head.scripts();
        if scripts
            .get(&self.id)
            .is_some_and(|s| s.generation == self.generation)
        {
            scripts.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_guard_drop_removes_script() {
        let head = DocumentHead::new();
        let guard = head.inject(FAQ_SCRIPT_ID, &json!({"@type": "FAQPage"}));
        assert!(head.contains(FAQ_SCRIPT_ID));
        drop(guard);
        assert!(head.is_empty());
    }

    #[test]
    fn test_reinject_replaces_and_old_guard_is_inert() {
        let head = DocumentHead::new();
        let first = head.inject(FAQ_SCRIPT_ID, &json!({"v": 1}));
        let second = head.inject(FAQ_SCRIPT_ID, &json!({"v": 2}));
        assert_eq!(head.len(), 1);

        drop(first);
        assert!(head.contains(FAQ_SCRIPT_ID));
        assert!(head.render().contains(r#"{"v":2}"#));

        drop(second);
        assert!(head.is_empty());
    }

    #[test]
    fn test_render_escapes_closing_tags() {
        let head = DocumentHead::new();
        let _guard = head.inject(PRODUCT_SCRIPT_ID, &json!({"name": "</script><b>"}));
        let html = head.render();
        assert!(html.starts_with(r#"<script type="application/ld+json" id="product-structured-data">"#));
        assert_eq!(html.matches("</script>").count(), 1);
    }
}
