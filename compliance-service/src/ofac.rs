//! OFAC SDN list source

use crate::config::Config;
use crate::error::{ComplianceError, Result};
use crate::reference::ReferenceSource;
use crate::types::{ReferenceDataset, ReferenceEntity};
use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use tracing::{info, warn};

const SOURCE_NAME: &str = "ofac_sdn";
const LIST_TYPE: &str = "SDN";

// sdn.xml structures
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SdnList {
    #[serde(default)]
    sdn_entry: Vec<SdnEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SdnEntry {
    uid: String,
    first_name: Option<String>,
    #[serde(default)]
    last_name: String,
    program_list: Option<ProgramList>,
    aka_list: Option<AkaList>,
}

#[derive(Debug, Deserialize)]
struct ProgramList {
    #[serde(default)]
    program: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AkaList {
    #[serde(default)]
    aka: Vec<Aka>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Aka {
    first_name: Option<String>,
    #[serde(default)]
    last_name: String,
}

/// Downloads the Treasury SDN list
#[derive(Debug, Clone)]
pub struct OfacSdnSource {
    client: reqwest::Client,
    url: String,
}

impl OfacSdnSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ComplianceError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: config.sdn_url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ReferenceSource for OfacSdnSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch(&self) -> Result<ReferenceDataset> {
        info!(url = %self.url, "Downloading OFAC SDN list");
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let entities = parse_sdn_xml(&body)?;
        Ok(ReferenceDataset::new(entities, SOURCE_NAME))
    }
}

/// Parse an SDN XML document into reference entities
pub fn parse_sdn_xml(xml: &str) -> Result<Vec<ReferenceEntity>> {
    let list: SdnList = from_str(xml).map_err(|e| {
        warn!("Failed to parse SDN XML: {}", e);
        ComplianceError::ReferenceParse(e.to_string())
    })?;

    let entities: Vec<ReferenceEntity> = list
        .sdn_entry
        .into_iter()
        .filter_map(|entry| {
            let primary_name = full_name(entry.first_name.as_deref(), &entry.last_name)?;
            let alt_names = entry
                .aka_list
                .map(|list| {
                    list.aka
                        .iter()
                        .filter_map(|aka| full_name(aka.first_name.as_deref(), &aka.last_name))
                        .collect()
                })
                .unwrap_or_default();
            let programs = entry.program_list.map(|p| p.program).unwrap_or_default();
            Some(ReferenceEntity {
                uid: entry.uid,
                primary_name,
                alt_names,
                programs,
                list_type: LIST_TYPE.to_string(),
            })
        })
        .collect();

    if entities.is_empty() {
        return Err(ComplianceError::ReferenceParse("SDN list contains no entries".into()));
    }
    Ok(entities)
}

fn full_name(first: Option<&str>, last: &str) -> Option<String> {
    let last = last.trim();
    let name = match first.map(str::trim).filter(|f| !f.is_empty()) {
        Some(first) if !last.is_empty() => format!("{} {}", first, last),
        Some(first) => first.to_string(),
        None => last.to_string(),
    };
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" standalone="yes"?>
<sdnList xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns="http://tempuri.org/sdnList.xsd">
  <publshInformation>
    <Publish_Date>01/02/2024</Publish_Date>
    <Record_Count>2</Record_Count>
  </publshInformation>
  <sdnEntry>
    <uid>36</uid>
    <lastName>AEROCARIBBEAN AIRLINES</lastName>
    <sdnType>Entity</sdnType>
    <programList>
      <program>CUBA</program>
    </programList>
    <akaList>
      <aka>
        <uid>12</uid>
        <type>a.k.a.</type>
        <category>strong</category>
        <lastName>AERO-CARIBBEAN</lastName>
      </aka>
    </akaList>
  </sdnEntry>
  <sdnEntry>
    <uid>2674</uid>
    <firstName>Abu</firstName>
    <lastName>ABBAS</lastName>
    <sdnType>Individual</sdnType>
    <programList>
      <program>SDGT</program>
      <program>IRAQ2</program>
    </programList>
  </sdnEntry>
</sdnList>"#;

    #[test]
    fn test_parse_sdn_entries() {
        let entities = parse_sdn_xml(SAMPLE).unwrap();
        assert_eq!(entities.len(), 2);

        assert_eq!(entities[0].uid, "36");
        assert_eq!(entities[0].primary_name, "AEROCARIBBEAN AIRLINES");
        assert_eq!(entities[0].alt_names, vec!["AERO-CARIBBEAN"]);
        assert_eq!(entities[0].programs, vec!["CUBA"]);
        assert_eq!(entities[0].list_type, "SDN");

        assert_eq!(entities[1].primary_name, "Abu ABBAS");
        assert_eq!(entities[1].programs, vec!["SDGT", "IRAQ2"]);
        assert!(entities[1].alt_names.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_sdn_xml("<html><body>Service Unavailable</body></html>"),
            Err(ComplianceError::ReferenceParse(_))
        ));
        assert!(parse_sdn_xml("not xml at all <").is_err());
    }

    #[test]
    fn test_full_name() {
        assert_eq!(full_name(Some(" Abu "), "ABBAS").as_deref(), Some("Abu ABBAS"));
        assert_eq!(full_name(None, "ACME"), Some("ACME".to_string()));
        assert_eq!(full_name(Some(""), " "), None);
    }
}
