/// Page snapshot and the per-audit query cache analyzers read it through.
///
/// `DomQuery` memoizes results per exact selector string. It lives inside an
/// `AuditContext`, which the engine creates fresh for every `analyze()` call,
/// so nothing cached outlives the audit that produced it.
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};

use crate::error::DomError;

/// Network timing captured when the page was loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PageTiming {
    /// Time until response headers arrived
    pub response_time: Duration,
    /// Time until the full body was read
    pub total_time: Duration,
    pub transfer_bytes: usize,
}

/// One loaded HTML document plus the metadata analyzers may need.
#[derive(Debug)]
pub struct Page {
    url: String,
    source: String,
    document: Html,
    headers: Vec<(String, String)>,
    timing: Option<PageTiming>,
}

impl Page {
    pub fn parse(url: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let document = Html::parse_document(&source);
        Self {
            url: url.into(),
            source,
            document,
            headers: Vec::new(),
            timing: None,
        }
    }

    /// Attach response headers. Names are stored lowercased.
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        self
    }

    pub fn with_timing(mut self, timing: PageTiming) -> Self {
        self.timing = Some(timing);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    pub fn timing(&self) -> Option<PageTiming> {
        self.timing
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Text of the first `<title>`, or an empty string.
    pub fn title(&self) -> String {
        Selector::parse("title")
            .ok()
            .and_then(|sel| self.document.select(&sel).next().map(element_text))
            .unwrap_or_default()
    }
}

/// Cache hit/miss counters for one `DomQuery`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    pub hits: usize,
    pub misses: usize,
}

/// Memoizing selector queries over a single document.
///
/// Interior mutability only; meant for the single-task join the engine uses.
pub struct DomQuery<'a> {
    document: &'a Html,
    selectors: RefCell<HashMap<String, Selector>>,
    many: RefCell<HashMap<String, Vec<ElementRef<'a>>>>,
    one: RefCell<HashMap<String, Option<ElementRef<'a>>>>,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl<'a> DomQuery<'a> {
    pub fn new(document: &'a Html) -> Self {
        Self {
            document,
            selectors: RefCell::new(HashMap::new()),
            many: RefCell::new(HashMap::new()),
            one: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    /// First element matching `selector`.
    pub fn query_one(&self, selector: &str) -> Result<Option<ElementRef<'a>>, DomError> {
        if let Some(cached) = self.one.borrow().get(selector) {
            self.hits.set(self.hits.get() + 1);
            return Ok(*cached);
        }
        self.misses.set(self.misses.get() + 1);

        let compiled = self.compile(selector)?;
        let found = self.document.select(&compiled).next();
        self.one.borrow_mut().insert(selector.to_string(), found);
        Ok(found)
    }

    /// All elements matching `selector`, in document order.
    pub fn query_many(&self, selector: &str) -> Result<Vec<ElementRef<'a>>, DomError> {
        if let Some(cached) = self.many.borrow().get(selector) {
            self.hits.set(self.hits.get() + 1);
            return Ok(cached.clone());
        }
        self.misses.set(self.misses.get() + 1);

        let compiled = self.compile(selector)?;
        let found: Vec<ElementRef<'a>> = self.document.select(&compiled).collect();
        self.many
            .borrow_mut()
            .insert(selector.to_string(), found.clone());
        Ok(found)
    }

    /// Value of `attr` on the first element matching `selector`.
    pub fn attr_of(&self, selector: &str, attr: &str) -> Result<Option<String>, DomError> {
        Ok(self
            .query_one(selector)?
            .and_then(|el| el.value().attr(attr).map(|v| v.trim().to_string())))
    }

    pub fn count(&self, selector: &str) -> Result<usize, DomError> {
        Ok(self.query_many(selector)?.len())
    }

    pub fn stats(&self) -> QueryStats {
        QueryStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
        }
    }

    /// Drop every cached result and compiled selector.
    pub fn clear(&self) {
        self.selectors.borrow_mut().clear();
        self.many.borrow_mut().clear();
        self.one.borrow_mut().clear();
    }

    fn compile(&self, selector: &str) -> Result<Selector, DomError> {
        if let Some(compiled) = self.selectors.borrow().get(selector) {
            return Ok(compiled.clone());
        }
        let compiled = Selector::parse(selector).map_err(|e| DomError::InvalidSelector {
            selector: selector.to_string(),
            message: format!("{e:?}"),
        })?;
        self.selectors
            .borrow_mut()
            .insert(selector.to_string(), compiled.clone());
        Ok(compiled)
    }
}

/// Everything an analyzer may read during one audit.
pub struct AuditContext<'a> {
    pub page: &'a Page,
    pub dom: DomQuery<'a>,
}

impl<'a> AuditContext<'a> {
    pub fn new(page: &'a Page) -> Self {
        Self {
            page,
            dom: DomQuery::new(page.document()),
        }
    }
}

/// Visible text of an element with whitespace runs collapsed.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
