//! System-prompt assembly, behind a small TTL-checked cache.
//!
//! The persona text is static today, but it is fetched through a loader so a
//! remotely-managed prompt drops in without touching call sites. The cache is
//! the only cross-request shared state in the core: reads are concurrent,
//! refreshes are idempotent overwrites, and a duplicate concurrent refresh
//! just writes the same bytes twice.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use indoc::indoc;

use crate::context::Context;

pub const SYSTEM_PROMPT_TTL: Duration = Duration::from_secs(300);

type PromptLoader = Box<dyn Fn() -> String + Send + Sync>;

struct CachedPrompt {
    text: String,
    fetched_at: Instant,
}

pub struct PromptCache {
    inner: RwLock<Option<CachedPrompt>>,
    ttl: Duration,
    loader: PromptLoader,
}

impl PromptCache {
    pub fn new() -> Self {
        Self::with_loader(SYSTEM_PROMPT_TTL, Box::new(consultant_persona))
    }

    pub fn with_loader(ttl: Duration, loader: PromptLoader) -> Self {
        Self {
            inner: RwLock::new(None),
            ttl,
            loader,
        }
    }

    /// The full system instruction for one request: cached persona text plus
    /// the request's contextual preamble.
    pub fn system_prompt(&self, context: &Context) -> String {
        let base = self.get_or_refresh();
        match context.preamble() {
            Some(preamble) => format!("{}\n\n{}", base.trim_end(), preamble),
            None => base,
        }
    }

    fn get_or_refresh(&self) -> String {
        if let Ok(guard) = self.inner.read() {
            if let Some(cached) = guard.as_ref() {
                if cached.fetched_at.elapsed() < self.ttl {
                    return cached.text.clone();
                }
            }
        }

        let text = (self.loader)();
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(CachedPrompt {
                text: text.clone(),
                fetched_at: Instant::now(),
            });
        }
        text
    }
}

impl Default for PromptCache {
    fn default() -> Self {
        Self::new()
    }
}

fn consultant_persona() -> String {
    indoc! {"
        You are a senior brand strategy consultant at a boutique agency,
        advising founders through naming, positioning and identity work.

        Respond like a written consulting deliverable, not a chat message:
        - Formal, precise language. No greetings, enthusiasm markers or emoji.
        - Structure every answer in markdown: a top-level title, `##` section
          headers, and bulleted lists for recommendations.
        - Ground advice in established practice: frameworks, metrics,
          benchmarks, methodology. Name the framework when you use one.
        - Every section should end in something the client can act on:
          concrete steps to implement, build or establish.
        - Responses longer than a page should open with an executive summary.
    "}
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_cache(ttl: Duration) -> (PromptCache, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();
        let cache = PromptCache::with_loader(
            ttl,
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                "persona".to_string()
            }),
        );
        (cache, loads)
    }

    #[test]
    fn prompt_is_cached_within_ttl() {
        let (cache, loads) = counting_cache(Duration::from_secs(300));
        cache.system_prompt(&Context::new());
        cache.system_prompt(&Context::new());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn expired_prompt_is_refetched() {
        let (cache, loads) = counting_cache(Duration::ZERO);
        cache.system_prompt(&Context::new());
        cache.system_prompt(&Context::new());
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn context_preamble_is_appended() {
        let cache = PromptCache::new();
        let context = Context::new().with_brand_idea("a zero-waste grocery");
        let prompt = cache.system_prompt(&context);
        assert!(prompt.contains("brand strategy consultant"));
        assert!(prompt.ends_with("Brand idea: a zero-waste grocery"));
    }
}
