use serde::Serialize;
use url::form_urlencoded;

/// Navigation state for a paged listing. Pages are 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageNav {
    pub current: u32,
    pub total: u32,
    pub previous: Option<u32>,
    pub next: Option<u32>,
}

/// Previous/next hrefs built from a [`PageNav`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub previous: Option<String>,
    pub indicator: String,
    pub next: Option<String>,
}

impl PageNav {
    pub fn new(current: u32, total: u32) -> Self {
        let current = current.max(1);
        Self {
            current,
            total,
            previous: (current > 1).then(|| current - 1),
            next: (current < total).then(|| current + 1),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Whether a pager is worth drawing at all.
    pub fn is_paged(&self) -> bool {
        self.total > 1
    }

    pub fn indicator(&self) -> String {
        format!("Page {} of {}", self.current, self.total)
    }

    /// Hrefs for `base_path` carrying `params` (e.g. `section`, `q`) ahead of
    /// the page number. Blank params are dropped.
    pub fn links(&self, base_path: &str, params: &[(&str, &str)]) -> PageLinks {
        let href = |page: u32| {
            let mut query = form_urlencoded::Serializer::new(String::new());
            for (key, value) in params.iter().filter(|(_, v)| !v.trim().is_empty()) {
                query.append_pair(key, value);
            }
            query.append_pair("page", &page.to_string());
            format!("{}?{}", base_path, query.finish())
        };

        PageLinks {
            previous: self.previous.map(&href),
            indicator: self.indicator(),
            next: self.next.map(&href),
        }
    }
}

/// Reads the `page` request parameter.
///
/// Absent, blank, non-numeric, zero and negative values all mean page 1;
/// fractional values are truncated.
pub fn parse_page(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return 1;
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 1.0 => value.trunc().min(u32::MAX as f64) as u32,
        _ => 1,
    }
}
