use std::collections::HashMap;
use std::time::Duration;

use crate::browser::ApplicantBrowser;
use crate::error::Result;

pub struct BrowserConfig {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub chrome_path: Option<String>,
    /// Upper bound on a page navigation (default: 30s).
    pub default_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            chrome_path: None,
            default_timeout: Duration::from_secs(30),
        }
    }
}

pub struct BrowserBuilder {
    config: BrowserConfig,
}

impl BrowserBuilder {
    pub fn new() -> Self {
        Self {
            config: BrowserConfig::default(),
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<String>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Set the upper bound on a page navigation.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    pub fn build_config(self) -> BrowserConfig {
        self.config
    }

    pub async fn build(self) -> Result<ApplicantBrowser> {
        ApplicantBrowser::launch(self.build_config()).await
    }
}

impl Default for BrowserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded waits used while reading and filling a form.
///
/// None of these is a retry budget: when one elapses the field or section
/// being processed is skipped and the pass moves on.
#[derive(Debug, Clone)]
pub struct Timeouts {
    /// How long an opened popup may take to render its options.
    pub element_wait: Duration,
    /// Pause after opening a popup or pressing an add button.
    pub animation_wait: Duration,
    /// How long a freshly added section instance may take to render fields.
    pub section_wait: Duration,
    /// Pause before reading the progress indicator of a freshly loaded step.
    pub settle: Duration,
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element_wait: Duration::from_millis(2000),
            animation_wait: Duration::from_millis(500),
            section_wait: Duration::from_millis(5000),
            settle: Duration::from_millis(3000),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl Timeouts {
    /// No pauses, and waits that give up after a handful of polls.
    /// Meant for pages that render synchronously, such as test doubles.
    pub fn immediate() -> Self {
        Self {
            element_wait: Duration::from_millis(50),
            animation_wait: Duration::ZERO,
            section_wait: Duration::from_millis(50),
            settle: Duration::ZERO,
            poll_interval: Duration::from_millis(5),
        }
    }
}

/// Knobs for one extraction pass.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub timeouts: Timeouts,
    /// How many instances to materialize per dynamic section, keyed by the
    /// section's display title. Sections not listed get one.
    pub section_instances: HashMap<String, usize>,
}

impl ExtractOptions {
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            timeouts,
            section_instances: HashMap::new(),
        }
    }

    pub fn with_section_instances(mut self, plan: HashMap<String, usize>) -> Self {
        self.section_instances = plan;
        self
    }

    pub fn instances_for(&self, section: &str) -> usize {
        self.section_instances.get(section).copied().unwrap_or(1)
    }
}
