//! Month config repository for JSON storage
//!
//! Stores one record per (envelope, month) in allocations.json. Deleted
//! records stay in the file as tombstones and are hidden from every read.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{EnvelopeId, Month, MonthConfig};

use super::file_io::{read_json, read_lock, write_json_atomic, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct MonthConfigData {
    #[serde(default)]
    month_configs: Vec<MonthConfig>,
}

/// Composite key enforcing uniqueness per envelope and month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthConfigKey {
    pub envelope_id: EnvelopeId,
    pub month: Month,
}

impl MonthConfigKey {
    pub fn new(envelope_id: EnvelopeId, month: Month) -> Self {
        Self { envelope_id, month }
    }
}

pub struct MonthConfigRepository {
    path: PathBuf,
    configs: RwLock<HashMap<MonthConfigKey, MonthConfig>>,
}

impl MonthConfigRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            configs: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: MonthConfigData = read_json(&self.path)?;

        let mut configs = write_lock(&self.configs)?;
        configs.clear();
        for config in file_data.month_configs {
            configs.insert(MonthConfigKey::new(config.envelope_id, config.month), config);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        let configs = read_lock(&self.configs)?;

        let mut month_configs: Vec<_> = configs.values().cloned().collect();
        month_configs.sort_by(|a, b| a.month.cmp(&b.month).then(a.created_at.cmp(&b.created_at)));

        write_json_atomic(&self.path, &MonthConfigData { month_configs })
    }

    /// Live record for (envelope, month)
    pub fn get(&self, envelope_id: EnvelopeId, month: Month) -> Result<Option<MonthConfig>, LedgerError> {
        Ok(read_lock(&self.configs)?
            .get(&MonthConfigKey::new(envelope_id, month))
            .filter(|c| !c.is_deleted())
            .cloned())
    }

    /// Records of one envelope before `until`, oldest first
    pub fn get_for_envelope(
        &self,
        envelope_id: EnvelopeId,
        until: Option<Month>,
    ) -> Result<Vec<MonthConfig>, LedgerError> {
        let configs = read_lock(&self.configs)?;
        let mut list: Vec<_> = configs
            .values()
            .filter(|c| c.envelope_id == envelope_id && !c.is_deleted())
            .filter(|c| until.map_or(true, |until| c.month < until))
            .cloned()
            .collect();
        list.sort_by_key(|c| c.month);
        Ok(list)
    }

    /// Insert or replace the record for its (envelope, month)
    ///
    /// Replacing a tombstone revives the key.
    pub fn upsert(&self, config: MonthConfig) -> Result<(), LedgerError> {
        write_lock(&self.configs)?.insert(MonthConfigKey::new(config.envelope_id, config.month), config);
        Ok(())
    }

    /// Tombstone the live record for (envelope, month), returning it
    pub fn delete(&self, envelope_id: EnvelopeId, month: Month) -> Result<Option<MonthConfig>, LedgerError> {
        let mut configs = write_lock(&self.configs)?;
        match configs.get_mut(&MonthConfigKey::new(envelope_id, month)) {
            Some(config) if !config.is_deleted() => {
                config.mark_deleted();
                Ok(Some(config.clone()))
            }
            _ => Ok(None),
        }
    }

    /// Stored records, tombstones included
    pub fn count(&self) -> Result<usize, LedgerError> {
        Ok(read_lock(&self.configs)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, MonthConfigRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = MonthConfigRepository::new(temp_dir.path().join("allocations.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_one_record_per_key() {
        let (_temp_dir, repo) = create_test_repo();
        let envelope = EnvelopeId::new();
        let jan = Month::new(2025, 1);

        repo.upsert(MonthConfig::with_allocation(envelope, jan, Money::from_cents(5000)))
            .unwrap();
        repo.upsert(MonthConfig::with_allocation(envelope, jan, Money::from_cents(7000)))
            .unwrap();

        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(
            repo.get(envelope, jan).unwrap().unwrap().allocation,
            Money::from_cents(7000)
        );
    }

    #[test]
    fn test_get_for_envelope_bounded() {
        let (temp_dir, repo) = create_test_repo();
        let envelope = EnvelopeId::new();
        for m in 1..=3 {
            repo.upsert(MonthConfig::new(envelope, Month::new(2025, m))).unwrap();
        }
        repo.upsert(MonthConfig::new(EnvelopeId::new(), Month::new(2025, 1)))
            .unwrap();
        repo.save().unwrap();

        let reloaded = MonthConfigRepository::new(temp_dir.path().join("allocations.json"));
        reloaded.load().unwrap();
        let configs = reloaded
            .get_for_envelope(envelope, Some(Month::new(2025, 3)))
            .unwrap();
        let months: Vec<_> = configs.iter().map(|c| c.month).collect();
        assert_eq!(months, vec![Month::new(2025, 1), Month::new(2025, 2)]);
    }

    #[test]
    fn test_delete_keeps_tombstone_on_disk() {
        let (temp_dir, repo) = create_test_repo();
        let envelope = EnvelopeId::new();
        let jan = Month::new(2025, 1);
        let feb = Month::new(2025, 2);

        repo.upsert(MonthConfig::new(envelope, jan)).unwrap();
        let config = MonthConfig::with_allocation(envelope, feb, Money::from_cents(2500));
        let id = config.id;
        repo.upsert(config).unwrap();

        assert!(repo.delete(envelope, feb).unwrap().unwrap().is_deleted());
        assert!(repo.delete(envelope, feb).unwrap().is_none());
        assert!(repo.get(envelope, feb).unwrap().is_none());
        assert_eq!(repo.get_for_envelope(envelope, None).unwrap().len(), 1);
        assert_eq!(repo.count().unwrap(), 2);
        repo.save().unwrap();

        let reloaded = MonthConfigRepository::new(temp_dir.path().join("allocations.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 2);
        assert!(reloaded.get(envelope, feb).unwrap().is_none());

        let contents = std::fs::read_to_string(temp_dir.path().join("allocations.json")).unwrap();
        assert!(contents.contains(&id.to_string()));
        assert!(contents.contains("deleted_at"));
    }

    #[test]
    fn test_upsert_revives_tombstoned_key() {
        let (_temp_dir, repo) = create_test_repo();
        let envelope = EnvelopeId::new();
        let feb = Month::new(2025, 2);

        repo.upsert(MonthConfig::new(envelope, feb)).unwrap();
        repo.delete(envelope, feb).unwrap();
        repo.upsert(MonthConfig::with_allocation(envelope, feb, Money::from_cents(900)))
            .unwrap();

        assert_eq!(
            repo.get(envelope, feb).unwrap().unwrap().allocation,
            Money::from_cents(900)
        );
        assert_eq!(repo.count().unwrap(), 1);
    }
}
