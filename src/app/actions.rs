//! Server actions.
//!
//! An action is bound to one route template. Invoking it from a path whose
//! page has that template runs it; invoking it from anywhere else yields a
//! [`TemplateFallback`] to the action's template.

use std::collections::{BTreeMap, HashMap};

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::app::pages::Page;
use crate::http::dispatch::TemplateFallback;

/// What an action receives when it runs.
#[derive(Debug)]
pub struct ActionInvocation<'a> {
    pub action: &'a str,
    pub action_id: &'a str,
    /// Path the action runs on, after any rewrite.
    pub path: &'a str,
    pub locale: &'a str,
    pub headers: &'a HeaderMap,
}

pub type ActionFn = fn(&ActionInvocation<'_>) -> ActionOutput;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutput {
    pub action: String,
    pub action_id: String,
    pub path: String,
    pub locale: String,
    pub headers: BTreeMap<String, String>,
}

#[derive(Clone)]
pub struct ServerAction {
    pub id: String,
    pub name: &'static str,
    pub route_template: &'static str,
    run: ActionFn,
}

impl ServerAction {
    pub fn new(
        id: impl Into<String>,
        name: &'static str,
        route_template: &'static str,
        run: ActionFn,
    ) -> Self {
        Self {
            id: id.into(),
            name,
            route_template,
            run,
        }
    }

    pub fn invoke(&self, invocation: &ActionInvocation<'_>) -> ActionOutput {
        (self.run)(invocation)
    }
}

impl std::fmt::Debug for ServerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerAction")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("route_template", &self.route_template)
            .finish_non_exhaustive()
    }
}

/// Result of looking up and resolving an action for a request.
#[derive(Debug)]
pub enum ActionOutcome {
    NotFound,
    Ran(ActionOutput),
    Fallback(TemplateFallback),
}

/// Actions by id. Built once at startup.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, ServerAction>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry the service ships with: the home page action.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ServerAction::new(
            HOME_PAGE_ACTION_ID,
            "homePageAction",
            Page::Home.template(),
            echo_headers,
        ));
        registry
    }

    pub fn register(&mut self, action: ServerAction) {
        self.actions.insert(action.id.clone(), action);
    }

    pub fn get(&self, id: &str) -> Option<&ServerAction> {
        self.actions.get(id)
    }

    /// Resolve an invocation of `action_id` on `path`, whose page has
    /// `template` (`None` when the path matched no page).
    pub fn resolve(
        &self,
        action_id: &str,
        path: &str,
        template: Option<&str>,
        locale: &str,
        headers: &HeaderMap,
    ) -> ActionOutcome {
        let Some(action) = self.get(action_id) else {
            return ActionOutcome::NotFound;
        };

        if template == Some(action.route_template) {
            return ActionOutcome::Ran(action.invoke(&ActionInvocation {
                action: action.name,
                action_id,
                path,
                locale,
                headers,
            }));
        }

        ActionOutcome::Fallback(TemplateFallback {
            path: action.route_template.to_string(),
            headers: headers.clone(),
        })
    }
}

pub const HOME_PAGE_ACTION_ID: &str = "home-page-action";

/// Returns the action id, the path it ran on and every request header.
pub fn echo_headers(invocation: &ActionInvocation<'_>) -> ActionOutput {
    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in invocation.headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    ActionOutput {
        action: invocation.action.to_string(),
        action_id: invocation.action_id.to_string(),
        path: invocation.path.to_string(),
        locale: invocation.locale.to_string(),
        headers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("next-action", HeaderValue::from_static(HOME_PAGE_ACTION_ID));
        headers.append("accept", HeaderValue::from_static("text/plain"));
        headers.append("accept", HeaderValue::from_static("text/html"));
        headers
    }

    #[test]
    fn test_runs_on_bound_template() {
        let registry = ActionRegistry::with_defaults();
        let headers = headers();
        match registry.resolve(
            HOME_PAGE_ACTION_ID,
            "/en-US/",
            Some("/[locale]"),
            "en-US",
            &headers,
        ) {
            ActionOutcome::Ran(output) => {
                assert_eq!(output.action, "homePageAction");
                assert_eq!(output.path, "/en-US/");
                assert_eq!(output.action_id, HOME_PAGE_ACTION_ID);
                assert_eq!(output.locale, "en-US");
                assert_eq!(output.headers["accept"], "text/plain, text/html");
            }
            other => panic!("expected action to run, got {:?}", other),
        }
    }

    #[test]
    fn test_falls_back_from_other_template() {
        let registry = ActionRegistry::with_defaults();
        let headers = headers();
        for template in [Some("/[locale]/about"), None] {
            match registry.resolve(HOME_PAGE_ACTION_ID, "/en-US/foo", template, "en-US", &headers) {
                ActionOutcome::Fallback(fallback) => {
                    assert_eq!(fallback.path, "/[locale]");
                    assert_eq!(fallback.headers, headers);
                }
                other => panic!("expected fallback, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_unknown_action() {
        let registry = ActionRegistry::with_defaults();
        assert!(matches!(
            registry.resolve("nope", "/en-US", Some("/[locale]"), "en-US", &HeaderMap::new()),
            ActionOutcome::NotFound
        ));
    }
}
