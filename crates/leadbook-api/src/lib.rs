// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use leadbook_app::{AgentEndpoint, Lead, LeadId, LeadPatch, LeadStore, NewLead};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Blocking client for the lead store and agent endpoints.
///
/// Agent calls run through a second HTTP client with its own, usually longer,
/// timeout: the agent may call tools before it answers.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    agent_timeout: Duration,
    http: HttpClient,
    agent_http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration, agent_timeout: Duration) -> Result<Self> {
        let base_url = validate_base_url(base_url)?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;
        let agent_http = HttpClient::builder()
            .timeout(agent_timeout)
            .build()
            .context("build agent HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            agent_timeout,
            http,
            agent_http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn agent_timeout(&self) -> Duration {
        self.agent_timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        self.send(request)?
            .json()
            .with_context(|| format!("decode {what}"))
    }
}

pub fn validate_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("api.base_url must not be empty");
    }
    let parsed = Url::parse(trimmed)
        .with_context(|| format!("api.base_url {trimmed:?} is not a valid URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "api.base_url must use http or https, got {:?}",
            parsed.scheme()
        );
    }
    if parsed.host_str().is_none() {
        bail!("api.base_url {trimmed:?} has no host");
    }
    Ok(trimmed.to_owned())
}

impl LeadStore for Client {
    fn list_leads(&self) -> Result<Vec<Lead>> {
        debug!(base_url = %self.base_url, "GET /leads");
        self.send_json(self.http.get(self.url("/leads")), "lead list")
    }

    fn get_lead(&self, id: LeadId) -> Result<Lead> {
        debug!(%id, "GET /leads/{{id}}");
        self.send_json(self.http.get(self.url(&format!("/leads/{id}"))), "lead")
    }

    fn create_lead(&self, lead: &NewLead) -> Result<Lead> {
        debug!(company = %lead.company_name, "POST /leads");
        self.send_json(self.http.post(self.url("/leads")).json(lead), "created lead")
    }

    fn update_lead(&self, id: LeadId, patch: &LeadPatch) -> Result<Lead> {
        debug!(%id, "PATCH /leads/{{id}}");
        self.send_json(
            self.http.patch(self.url(&format!("/leads/{id}"))).json(patch),
            "updated lead",
        )
    }

    fn delete_lead(&self, id: LeadId) -> Result<()> {
        debug!(%id, "DELETE /leads/{{id}}");
        self.send(self.http.delete(self.url(&format!("/leads/{id}"))))?;
        Ok(())
    }
}

impl AgentEndpoint for Client {
    fn chat(&self, message: &str) -> Result<String> {
        debug!(chars = message.len(), "POST /api/agent/chat");
        let reply: ChatResponse = self.send_json(
            self.agent_http
                .post(self.url("/api/agent/chat"))
                .json(&ChatRequest { message }),
            "agent reply",
        )?;
        Ok(reply.response)
    }

    fn reset(&self) -> Result<()> {
        debug!("POST /api/agent/reset");
        self.send(self.agent_http.post(self.url("/api/agent/reset")))?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    detail: Option<serde_json::Value>,
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    let reason = if error.is_timeout() {
        "request timed out".to_owned()
    } else {
        error.to_string()
    };
    anyhow::anyhow!(
        "cannot reach {base_url} -- is the backend running? check [api].base_url ({reason})"
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(detail) = parsed.detail
    {
        let detail = match detail {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        };
        if !detail.is_empty() {
            return anyhow::anyhow!("server error ({}): {}", status.as_u16(), detail);
        }
    }

    let body = body.trim();
    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return anyhow::anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow::anyhow!("server returned {}", status.as_u16())
}
