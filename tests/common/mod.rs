#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use frontmatter_validator::{
    ConfigResolver, ExcludeRules, ValidationConfig, ValidationEngine, ValidationMode,
};

/// Page that passes every check at `reference_now()`
pub const VALID_PAGE: &str = "---
title: A perfectly fine page
description: This description is long enough to pass every single length check.
owner:
  - https://github.com/orgs/giantswarm/teams/team-honeybadger
last_review_date: 2024-05-01
user_questions:
  - What does this page explain?
---
# Body
";

/// Page whose review date is more than a year before `reference_now()`
pub const STALE_PAGE: &str = "---
title: Upgrading clusters
description: How to upgrade a workload cluster without surprises or downtime.
owner:
  - https://github.com/orgs/giantswarm/teams/team-phoenix
last_review_date: 2020-01-15
user_questions:
  - How do I upgrade a cluster?
---
Body
";

pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn engine_with(resolver: ConfigResolver) -> ValidationEngine {
    ValidationEngine::new(resolver, ExcludeRules::default(), ValidationConfig::default())
}

pub fn builtin_engine() -> ValidationEngine {
    engine_with(ConfigResolver::builtin())
}

pub fn engine_in_mode(mode: ValidationMode) -> ValidationEngine {
    ValidationEngine::new(
        ConfigResolver::builtin(),
        ExcludeRules::default(),
        ValidationConfig {
            mode,
            ..ValidationConfig::default()
        },
    )
}

/// Build a page from front matter lines
pub fn page(front_matter: &str) -> String {
    format!("---\n{}---\nBody\n", front_matter)
}

/// Temporary documentation tree
pub struct DocsTree {
    pub dir: TempDir,
}

impl DocsTree {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }
}
