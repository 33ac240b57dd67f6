use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Completer, Completion};

/// One scripted reply: text, or an error message to fail with.
pub type Reply = std::result::Result<String, String>;

/// A scripted completer for tests. Returns pre-defined replies in order
/// and records every prompt it was given.
pub struct MockCompleter {
    replies: Vec<Reply>,
    index: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockCompleter {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies,
            index: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// `n` successful replies: `"reply 1"`, `"reply 2"`, ...
    pub fn numbered(n: usize) -> Self {
        Self::new((1..=n).map(|i| Ok(format!("reply {i}"))).collect())
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Completer for MockCompleter {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        self.prompts
            .lock()
            .map_err(|_| anyhow!("MockCompleter: prompt log poisoned"))?
            .push(prompt.to_string());

        let i = self.index.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.get(i).ok_or_else(|| {
            anyhow!("MockCompleter: no more replies (called {} times)", i + 1)
        })?;
        match reply {
            Ok(text) => Ok(Completion {
                text: text.clone(),
                usage: None,
            }),
            Err(msg) => bail!("{msg}"),
        }
    }
}
