//! Static preset catalog.
//!
//! A preset bundles the extraction and classification schema for one ticket
//! domain: the entity labels the extractor looks for, the intent taxonomy,
//! the shared severity taxonomy, and the structured ticket fields. Presets are
//! plain data keyed by a closed [`PresetKey`] enum; nothing here is mutable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity taxonomy shared by every preset, most severe first.
pub const SEVERITIES: &[&str] = &["sev0", "sev1", "sev2", "sev3"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PresetError {
    #[error("unknown preset: {0}")]
    Unknown(String),
}

/// Identifier of one of the built-in presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetKey {
    SaasSupport,
    AuthIncident,
    Billing,
}

impl PresetKey {
    /// All presets in display order.
    pub const ALL: [PresetKey; 3] = [Self::SaasSupport, Self::AuthIncident, Self::Billing];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SaasSupport => "saas_support",
            Self::AuthIncident => "auth_incident",
            Self::Billing => "billing",
        }
    }
}

impl fmt::Display for PresetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetKey {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| PresetError::Unknown(s.to_string()))
    }
}

/// One structured output field: `name::type::description` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub description: &'static str,
}

impl FieldSpec {
    const fn text(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: "str",
            description,
        }
    }

    /// Render as the extractor's field-schema entry.
    pub fn schema_entry(&self) -> String {
        format!("{}::{}::{}", self.name, self.kind, self.description)
    }
}

/// Schema configuration for one ticket domain.
#[derive(Debug, Serialize)]
pub struct Preset {
    #[serde(rename = "id")]
    pub key: PresetKey,
    pub name: &'static str,
    pub description: &'static str,
    pub entity_labels: &'static [&'static str],
    pub intents: &'static [&'static str],
    pub severities: &'static [&'static str],
    pub fields: &'static [FieldSpec],
    /// Quick-sample tickets offered by the UI; the first one is preloaded.
    pub samples: &'static [&'static str],
}

impl Preset {
    /// Field schema entries in catalog order.
    pub fn schema_entries(&self) -> Vec<String> {
        self.fields.iter().map(FieldSpec::schema_entry).collect()
    }
}

// ── Catalog ──

static SAAS_SUPPORT: Preset = Preset {
    key: PresetKey::SaasSupport,
    name: "SaaS Support Triage (default)",
    description: "Extract product/integration/env + classify severity/intent + build JSON ticket fields",
    entity_labels: &[
        "customer_name",
        "company",
        "product",
        "feature",
        "integration",
        "error_code",
        "environment",
        "cloud",
        "region",
    ],
    intents: &["bug", "how_to", "access", "incident", "billing", "other"],
    severities: SEVERITIES,
    fields: &[
        FieldSpec::text("customer_name", "Customer name"),
        FieldSpec::text("company", "Company name"),
        FieldSpec::text("product", "Product area"),
        FieldSpec::text("feature", "Feature area"),
        FieldSpec::text("integration", "Integration mentioned"),
        FieldSpec::text("error_code", "Error code if present"),
        FieldSpec::text("environment", "prod/stage/dev"),
        FieldSpec::text("cloud", "aws/gcp/azure if present"),
        FieldSpec::text("region", "Region"),
        FieldSpec::text("intent", "Intent label"),
        FieldSpec::text("severity", "sev0-sev3"),
        FieldSpec::text("next_queue", "Routing queue"),
    ],
    samples: &[
        "Hi team — we're seeing ERROR_CODE=KAFKA_403 when trying to publish events from our AWS us-west-2 cluster. This started after we enabled PrivateLink yesterday. Prod only. Can you help? We're Enterprise tier.",
        "Our Snowflake sink integration is failing with 401s. We rotated credentials in Okta and now the connector can't authenticate. Happens in staging and prod. Please advise.",
    ],
};

static AUTH_INCIDENT: Preset = Preset {
    key: PresetKey::AuthIncident,
    name: "Auth / SSO Incident",
    description: "Focus on SSO, IdP, auth errors, and incident routing",
    entity_labels: &[
        "customer_name",
        "company",
        "idp",
        "integration",
        "product",
        "error_code",
        "environment",
        "region",
    ],
    intents: &[
        "sso_issue",
        "login_issue",
        "access_request",
        "incident_report",
        "how_to",
        "other",
    ],
    severities: SEVERITIES,
    fields: &[
        FieldSpec::text("customer_name", "Customer name"),
        FieldSpec::text("company", "Company name"),
        FieldSpec::text("idp", "Identity provider (Okta/AzureAD/etc.)"),
        FieldSpec::text("integration", "Integration name"),
        FieldSpec::text("error_code", "Error code if present"),
        FieldSpec::text("environment", "prod/stage/dev"),
        FieldSpec::text("region", "Region"),
        FieldSpec::text("intent", "Intent label"),
        FieldSpec::text("severity", "sev0-sev3"),
        FieldSpec::text("next_queue", "Routing queue"),
    ],
    samples: &[
        "SSO login is broken for multiple users. Okta shows successful auth but your app returns 500. This is impacting all users in prod (us-east-1). Please treat as urgent.",
        "Need access request: add john.doe@acme.com to Admin role. We're using AzureAD SSO. Also seeing intermittent 'invalid_saml_response' errors.",
    ],
};

static BILLING: Preset = Preset {
    key: PresetKey::Billing,
    name: "Billing / Subscription",
    description: "Extract plan, invoice IDs, pricing, and billing intent",
    entity_labels: &[
        "customer_name",
        "company",
        "plan",
        "invoice_id",
        "amount",
        "currency",
        "product",
        "date",
        "region",
    ],
    intents: &[
        "billing_question",
        "refund_request",
        "invoice_issue",
        "pricing",
        "cancelation",
        "other",
    ],
    severities: SEVERITIES,
    fields: &[
        FieldSpec::text("customer_name", "Customer name"),
        FieldSpec::text("company", "Company name"),
        FieldSpec::text("plan", "Plan name if mentioned"),
        FieldSpec::text("invoice_id", "Invoice ID if present"),
        FieldSpec::text("amount", "Amount if present"),
        FieldSpec::text("currency", "Currency if present"),
        FieldSpec::text("intent", "Billing intent category"),
        FieldSpec::text("severity", "sev0-sev3"),
        FieldSpec::text("next_queue", "Routing queue"),
    ],
    samples: &[
        "We were billed twice for Invoice INV-19383 ($4,500 USD) for the Pro plan. Can you refund the duplicate charge?",
        "We want to cancel at the end of the term. What's the pricing to downgrade from Enterprise to Team? Also please confirm the renewal date.",
    ],
};

/// Look up the configuration for a preset.
pub fn describe(key: PresetKey) -> &'static Preset {
    match key {
        PresetKey::SaasSupport => &SAAS_SUPPORT,
        PresetKey::AuthIncident => &AUTH_INCIDENT,
        PresetKey::Billing => &BILLING,
    }
}

/// All presets in display order.
pub fn catalog() -> impl Iterator<Item = &'static Preset> {
    PresetKey::ALL.into_iter().map(describe)
}
