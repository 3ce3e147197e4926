// Champion id -> name mapping from Data Dragon

use serde_json::Value;
use std::collections::HashMap;
use tracing::info;

use crate::error::{LcuError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChampionMap {
  names: HashMap<i64, String>,
}

impl ChampionMap {
  /// Fetch the latest `champion.json` from Data Dragon rooted at `base_url`.
  pub async fn fetch(client: &reqwest::Client, base_url: &str) -> Result<Self> {
    let base_url = base_url.trim_end_matches('/');

    let versions = get_json(client, &format!("{}/api/versions.json", base_url)).await?;
    let latest = versions
      .as_array()
      .and_then(|v| v.first())
      .and_then(|v| v.as_str())
      .ok_or_else(|| LcuError::ChampionData("versions.json has no versions".to_string()))?
      .to_string();
    info!("[Champions] Using Data Dragon version: {}", latest);

    let data = get_json(
      client,
      &format!("{}/cdn/{}/data/en_US/champion.json", base_url, latest),
    )
    .await?;
    let map = Self::from_champion_json(&data)?;
    info!("[Champions] Loaded {} champions from Data Dragon", map.len());
    Ok(map)
  }

  /// Build from a Data Dragon `champion.json` document: `data.<Name>.key` is
  /// the numeric id as a string.
  pub fn from_champion_json(json: &Value) -> Result<Self> {
    let data = json
      .get("data")
      .and_then(|d| d.as_object())
      .ok_or_else(|| LcuError::ChampionData("champion.json has no data object".to_string()))?;

    let names = data
      .iter()
      .filter_map(|(name, entry)| {
        let id = entry.get("key")?.as_str()?.parse::<i64>().ok()?;
        Some((id, name.clone()))
      })
      .collect();
    Ok(Self { names })
  }

  pub fn from_pairs<I, S>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (i64, S)>,
    S: Into<String>,
  {
    Self {
      names: pairs.into_iter().map(|(id, n)| (id, n.into())).collect(),
    }
  }

  pub fn name(&self, id: i64) -> Option<&str> {
    self.names.get(&id).map(String::as_str)
  }

  /// Roster slot name: unpicked (id <= 0) and unknown ids become `""`.
  pub fn name_or_empty(&self, id: i64) -> String {
    if id <= 0 {
      return String::new();
    }
    self.name(id).unwrap_or_default().to_string()
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }
}

async fn get_json(client: &reqwest::Client, url: &str) -> Result<Value> {
  let resp = client.get(url).send().await.map_err(|source| LcuError::Http {
    url: url.to_string(),
    source,
  })?;
  if !resp.status().is_success() {
    return Err(LcuError::Status {
      status: resp.status().as_u16(),
      url: url.to_string(),
    });
  }
  resp.json::<Value>().await.map_err(|source| LcuError::Http {
    url: url.to_string(),
    source,
  })
}
