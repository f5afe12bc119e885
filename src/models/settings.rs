//! Site settings model matching the frontend SiteSettings interface.

use serde::{Deserialize, Serialize};

use crate::gateway::SettingsRecord;

/// Company-wide settings shown in the header, footer and contact page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    /// Remote row identifier, absent until the singleton row exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub company_name: String,
    pub phone: String,
    pub whatsapp: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub logo: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            id: None,
            company_name: "Univers Bâti Groupe".to_string(),
            phone: "+33 1 23 45 67 89".to_string(),
            whatsapp: "https://wa.me/33123456789".to_string(),
            email: "contact@universbatigroupe.fr".to_string(),
            address: "123 Avenue de la Construction".to_string(),
            city: "Paris".to_string(),
            postal_code: "75001".to_string(),
            logo: "/lovable-uploads/aecf2a1e-ca1c-4c7d-82df-341c4b5a917f.png".to_string(),
        }
    }
}

impl SiteSettings {
    /// Return a copy with every field present in `patch` overwritten.
    pub fn merged(&self, patch: &SiteSettingsPatch) -> Self {
        Self {
            id: self.id.clone(),
            company_name: patch
                .company_name
                .clone()
                .unwrap_or_else(|| self.company_name.clone()),
            phone: patch.phone.clone().unwrap_or_else(|| self.phone.clone()),
            whatsapp: patch
                .whatsapp
                .clone()
                .unwrap_or_else(|| self.whatsapp.clone()),
            email: patch.email.clone().unwrap_or_else(|| self.email.clone()),
            address: patch
                .address
                .clone()
                .unwrap_or_else(|| self.address.clone()),
            city: patch.city.clone().unwrap_or_else(|| self.city.clone()),
            postal_code: patch
                .postal_code
                .clone()
                .unwrap_or_else(|| self.postal_code.clone()),
            logo: patch.logo.clone().unwrap_or_else(|| self.logo.clone()),
        }
    }
}

impl From<SettingsRecord> for SiteSettings {
    fn from(record: SettingsRecord) -> Self {
        Self {
            id: Some(record.id),
            company_name: record.company_name,
            phone: record.phone.unwrap_or_default(),
            whatsapp: record.whatsapp.unwrap_or_default(),
            email: record.email.unwrap_or_default(),
            address: record.address.unwrap_or_default(),
            city: record.city.unwrap_or_default(),
            postal_code: record.postal_code.unwrap_or_default(),
            logo: record.logo.unwrap_or_default(),
        }
    }
}

/// Request body for a partial settings update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettingsPatch {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_only_touches_patched_fields() {
        let base = SiteSettings::default();
        let patch = SiteSettingsPatch {
            phone: Some("+33 6 00 00 00 00".to_string()),
            city: Some("Lyon".to_string()),
            ..Default::default()
        };

        let merged = base.merged(&patch);

        assert_eq!(merged.phone, "+33 6 00 00 00 00");
        assert_eq!(merged.city, "Lyon");
        assert_eq!(merged.company_name, base.company_name);
        assert_eq!(merged.postal_code, base.postal_code);
        assert_eq!(merged.id, None);
    }

    #[test]
    fn test_record_nulls_become_empty_strings() {
        let record = SettingsRecord {
            id: "row-1".to_string(),
            company_name: "UBG".to_string(),
            phone: None,
            whatsapp: None,
            email: Some("a@b.fr".to_string()),
            address: None,
            city: None,
            postal_code: None,
            logo: None,
        };

        let settings = SiteSettings::from(record);
        assert_eq!(settings.id.as_deref(), Some("row-1"));
        assert_eq!(settings.phone, "");
        assert_eq!(settings.email, "a@b.fr");
    }
}
