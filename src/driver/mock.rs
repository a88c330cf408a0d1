//! In-memory page used by tests: reviews arrive in batches, one batch per
//! successful "load more" click.

use std::sync::Mutex;

use async_trait::async_trait;

use super::PageDriver;
use crate::config::Selectors;
use crate::error::DriverError;

#[derive(Debug, Clone)]
pub struct MockReview {
    pub name: String,
    pub body: Option<String>,
    pub label: Option<String>,
    pub date: String,
    pub broken_name: bool,
}

impl MockReview {
    pub fn new(name: &str, body: &str, date: &str) -> Self {
        MockReview {
            name: name.to_string(),
            body: Some(body.to_string()),
            label: None,
            date: date.to_string(),
            broken_name: false,
        }
    }

    pub fn rated(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Reading the name throws, as a detached node would.
    pub fn broken(mut self) -> Self {
        self.broken_name = true;
        self
    }

    pub fn without_body(mut self) -> Self {
        self.body = None;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockElement {
    Container(usize),
    /// (review, child) inside the name row: child 0 is the name, 1 the date.
    NameRow(usize, usize),
    Body(usize),
    Rating(usize),
    LoadMore,
}

#[derive(Debug, Default)]
struct MockState {
    loaded: usize,
    clicks: usize,
    failures_left: u32,
    visited: Vec<String>,
}

pub struct MockPage {
    selectors: Selectors,
    batches: Vec<Vec<MockReview>>,
    always_fail: bool,
    vanish_on_click: bool,
    control_unreachable: bool,
    state: Mutex<MockState>,
}

impl MockPage {
    pub fn new(batches: Vec<Vec<MockReview>>) -> Self {
        MockPage {
            selectors: Selectors::default(),
            batches,
            always_fail: false,
            vanish_on_click: false,
            control_unreachable: false,
            state: Mutex::new(MockState {
                loaded: 1,
                ..Default::default()
            }),
        }
    }

    /// The next `n` clicks fail while the control stays on the page.
    pub fn failing_clicks(self, n: u32) -> Self {
        self.state.lock().unwrap().failures_left = n;
        self
    }

    /// Every click fails and the control never goes away.
    pub fn stuck(mut self) -> Self {
        self.always_fail = true;
        self
    }

    /// The first click throws, and the control is gone from the page afterwards.
    pub fn vanishing_click(mut self) -> Self {
        self.vanish_on_click = true;
        self
    }

    /// Looking up the control by role fails outright.
    pub fn unreachable_control(mut self) -> Self {
        self.control_unreachable = true;
        self
    }

    pub fn clicks(&self) -> usize {
        self.state.lock().unwrap().clicks
    }

    pub fn visited(&self) -> Vec<String> {
        self.state.lock().unwrap().visited.clone()
    }

    fn visible(&self) -> Vec<MockReview> {
        let loaded = self.state.lock().unwrap().loaded;
        self.batches
            .iter()
            .take(loaded)
            .flatten()
            .cloned()
            .collect()
    }

    fn review(&self, idx: usize) -> Result<MockReview, DriverError> {
        self.visible()
            .get(idx)
            .cloned()
            .ok_or_else(|| DriverError::Interaction(format!("container {} detached", idx)))
    }

    fn has_more(&self) -> bool {
        self.state.lock().unwrap().loaded < self.batches.len()
    }
}

#[async_trait]
impl PageDriver for MockPage {
    type Element = MockElement;

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.state.lock().unwrap().visited.push(url.to_string());
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<MockElement>, DriverError> {
        if selector == self.selectors.container {
            Ok((0..self.visible().len()).map(MockElement::Container).collect())
        } else {
            Ok(Vec::new())
        }
    }

    async fn query_within(
        &self,
        scope: &MockElement,
        selector: &str,
    ) -> Result<Vec<MockElement>, DriverError> {
        let MockElement::Container(i) = *scope else {
            return Ok(Vec::new());
        };
        let review = self.review(i)?;
        let s = &self.selectors;
        let found = if selector == s.name || selector == s.name_row {
            vec![MockElement::NameRow(i, 0), MockElement::NameRow(i, 1)]
        } else if selector == s.body {
            review.body.map(|_| MockElement::Body(i)).into_iter().collect()
        } else if selector == s.rating {
            review.label.map(|_| MockElement::Rating(i)).into_iter().collect()
        } else {
            Vec::new()
        };
        Ok(found)
    }

    async fn find_by_role(&self, role: &str, name: &str) -> Result<Vec<MockElement>, DriverError> {
        let matches = role == self.selectors.load_more_role
            && self
                .selectors
                .load_more_label
                .to_lowercase()
                .contains(&name.to_lowercase());
        if self.control_unreachable {
            return Err(DriverError::Query {
                selector: format!("[role=\"{}\"]", role),
                message: "target closed".into(),
            });
        }
        if matches && self.has_more() {
            Ok(vec![MockElement::LoadMore])
        } else {
            Ok(Vec::new())
        }
    }

    async fn inner_text(&self, element: &MockElement) -> Result<String, DriverError> {
        match *element {
            MockElement::NameRow(i, 0) => {
                let r = self.review(i)?;
                if r.broken_name {
                    Err(DriverError::Interaction(format!("name of review {} unreadable", i)))
                } else {
                    Ok(r.name)
                }
            }
            MockElement::NameRow(i, _) => Ok(self.review(i)?.date),
            MockElement::Body(i) => Ok(self.review(i)?.body.unwrap_or_default()),
            _ => Ok(String::new()),
        }
    }

    async fn accessible_label(&self, element: &MockElement) -> Result<Option<String>, DriverError> {
        match *element {
            MockElement::Rating(i) => Ok(self.review(i)?.label),
            _ => Ok(None),
        }
    }

    async fn click(&self, element: &MockElement) -> Result<(), DriverError> {
        if *element != MockElement::LoadMore {
            return Ok(());
        }
        let mut state = self.state.lock().unwrap();
        state.clicks += 1;
        if self.always_fail {
            return Err(DriverError::Interaction("element is not clickable".into()));
        }
        if self.vanish_on_click {
            state.loaded = self.batches.len();
            return Err(DriverError::Interaction("element is detached".into()));
        }
        if state.failures_left > 0 {
            state.failures_left -= 1;
            return Err(DriverError::Interaction("element is not clickable".into()));
        }
        state.loaded += 1;
        Ok(())
    }
}
