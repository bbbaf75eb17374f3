//! Envelope service
//!
//! Computes envelope balances with the rollover rules in
//! [`crate::services::rollover`] and manages envelopes and their month
//! configs on top of [`Storage`].

use std::collections::HashMap;

use tracing::{debug, info};

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::LedgerReader;
use crate::models::{
    AccountId, BudgetId, CategoryId, Envelope, EnvelopeId, EnvelopeMonth, Flow, Money, Month,
    MonthConfig, MonthConfigId, OverspendMode, Transaction,
};
use crate::storage::Storage;

use super::rollover::EnvelopeHistory;

/// Fields to change on a month config; `None` leaves a field as it is
#[derive(Debug, Clone, Default)]
pub struct MonthConfigUpdate {
    pub allocation: Option<Money>,
    pub overspend_mode: Option<OverspendMode>,
    pub note: Option<String>,
}

pub struct EnvelopeService<'a, R: ?Sized = Storage> {
    reader: &'a R,
}

impl<'a, R: LedgerReader + ?Sized> EnvelopeService<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    /// Envelope balance at the end of `target`
    ///
    /// An envelope without any record has a balance of zero.
    pub fn balance(&self, envelope_id: EnvelopeId, target: Month) -> LedgerResult<Money> {
        let (history, _) = self.history(envelope_id, target)?;
        Ok(history.balance(target))
    }

    /// The envelope's figures for `target` plus the id of the month config
    /// holding its allocation, if there is one
    pub fn month(
        &self,
        envelope_id: EnvelopeId,
        target: Month,
    ) -> LedgerResult<(EnvelopeMonth, Option<MonthConfigId>)> {
        let envelope = self
            .reader
            .envelope(envelope_id)?
            .ok_or_else(|| LedgerError::envelope_not_found(envelope_id.to_string()))?;
        let summary = self.month_of(&envelope, target)?;
        let allocation_id = summary.allocation_id;
        Ok((summary, allocation_id))
    }

    /// Same as [`Self::month`] for an already loaded envelope
    pub fn month_of(&self, envelope: &Envelope, target: Month) -> LedgerResult<EnvelopeMonth> {
        let (history, config) = self.history(envelope.id, target)?;
        let activity = history.get(target);

        Ok(EnvelopeMonth {
            envelope_id: envelope.id,
            name: envelope.name.clone(),
            month: target,
            spent: activity.map_or(Money::ZERO, |a| -a.net),
            balance: history.balance(target),
            allocation: config.as_ref().map_or(Money::ZERO, |c| c.allocation),
            allocation_id: config.map(|c| c.id),
        })
    }

    /// Gather every record of the envelope up to and including `target`,
    /// along with the config of `target` itself
    fn history(
        &self,
        envelope_id: EnvelopeId,
        target: Month,
    ) -> LedgerResult<(EnvelopeHistory, Option<MonthConfig>)> {
        let boundary = Some(target.next());
        let transactions = self.reader.envelope_transactions(envelope_id, boundary)?;
        let configs = self.reader.month_configs(envelope_id, boundary)?;

        let mut history = EnvelopeHistory::new();
        let mut on_budget: HashMap<AccountId, Option<bool>> = HashMap::new();

        for txn in &transactions {
            let amount = match self.flow(txn, &mut on_budget)? {
                Flow::Incoming => txn.amount,
                Flow::Outgoing => -txn.amount,
            };
            history.add_flow(txn.month(), amount);
        }

        let mut target_config = None;
        for config in configs {
            history.set_config(config.month, config.allocation, config.overspend_mode);
            if config.month == target {
                target_config = Some(config);
            }
        }

        debug!(
            envelope = %envelope_id,
            %target,
            transactions = transactions.len(),
            first = ?history.first_month().map(|m| m.to_string()),
            "loaded envelope history"
        );

        Ok((history, target_config))
    }

    /// Money leaving an on-budget account is spent from the envelope; money
    /// arriving into one refills it
    fn flow(
        &self,
        txn: &Transaction,
        cache: &mut HashMap<AccountId, Option<bool>>,
    ) -> LedgerResult<Flow> {
        let source = self.on_budget(txn.source_account_id, cache)?;
        Ok(match source {
            Some(true) => Flow::Outgoing,
            Some(false) => Flow::Incoming,
            None => match self.on_budget(txn.destination_account_id, cache)? {
                Some(true) => Flow::Incoming,
                _ => Flow::Outgoing,
            },
        })
    }

    fn on_budget(
        &self,
        account: AccountId,
        cache: &mut HashMap<AccountId, Option<bool>>,
    ) -> LedgerResult<Option<bool>> {
        if let Some(known) = cache.get(&account) {
            return Ok(*known);
        }
        let flag = self
            .reader
            .account_including_deleted(account)?
            .map(|a| a.on_budget);
        cache.insert(account, flag);
        Ok(flag)
    }
}

impl<'a> EnvelopeService<'a, Storage> {
    pub fn create(&self, category_id: CategoryId, name: &str) -> LedgerResult<Envelope> {
        let storage = self.reader;
        let category = storage
            .budgets
            .get_category(category_id)?
            .ok_or_else(|| LedgerError::category_not_found(category_id.to_string()))?;

        let name = name.trim();
        if storage
            .budgets
            .get_envelope_by_name(category.budget_id, name)?
            .is_some()
        {
            return Err(LedgerError::Duplicate {
                entity_type: "Envelope",
                identifier: name.to_string(),
            });
        }

        let mut envelope = Envelope::new(category_id, name);
        envelope.sort_order = storage.budgets.get_envelopes(category_id)?.len() as i32;
        envelope
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        storage.budgets.upsert_envelope(envelope.clone())?;
        storage.budgets.save()?;
        storage.log_create(
            EntityType::Envelope,
            envelope.id.to_string(),
            Some(envelope.name.clone()),
            &envelope,
        )?;

        info!(envelope = %envelope.id, name = %envelope.name, "created envelope");
        Ok(envelope)
    }

    /// Find a live envelope of a budget by name or ID string
    pub fn find(&self, budget_id: BudgetId, identifier: &str) -> LedgerResult<Option<Envelope>> {
        let storage = self.reader;
        if let Some(envelope) = storage.budgets.get_envelope_by_name(budget_id, identifier)? {
            return Ok(Some(envelope));
        }

        let Ok(id) = identifier.parse::<EnvelopeId>() else {
            return Ok(None);
        };
        if storage.budgets.budget_of_envelope(id)? != Some(budget_id) {
            return Ok(None);
        }
        storage.budgets.get_envelope(id)
    }

    pub fn list(&self, budget_id: BudgetId) -> LedgerResult<Vec<Envelope>> {
        self.reader.budgets.get_budget_envelopes(budget_id)
    }

    pub fn rename(&self, id: EnvelopeId, name: &str) -> LedgerResult<Envelope> {
        let storage = self.reader;
        let mut envelope = storage
            .budgets
            .get_envelope(id)?
            .ok_or_else(|| LedgerError::envelope_not_found(id.to_string()))?;
        let before = envelope.clone();

        envelope.rename(name.trim());
        envelope
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        storage.budgets.upsert_envelope(envelope.clone())?;
        storage.budgets.save()?;
        storage.log_update(
            EntityType::Envelope,
            envelope.id.to_string(),
            Some(envelope.name.clone()),
            &before,
            &envelope,
        )?;

        Ok(envelope)
    }

    /// Tombstone an envelope; its transactions and configs stay in storage
    pub fn delete(&self, id: EnvelopeId) -> LedgerResult<Envelope> {
        let storage = self.reader;
        let mut envelope = storage
            .budgets
            .get_envelope(id)?
            .ok_or_else(|| LedgerError::envelope_not_found(id.to_string()))?;

        envelope.mark_deleted();
        storage.budgets.upsert_envelope(envelope.clone())?;
        storage.budgets.save()?;
        storage.log_delete(
            EntityType::Envelope,
            envelope.id.to_string(),
            Some(envelope.name.clone()),
            &envelope,
        )?;

        info!(envelope = %envelope.id, "deleted envelope");
        Ok(envelope)
    }

    /// Create or change the single month config of an envelope for `month`
    pub fn set_month_config(
        &self,
        envelope_id: EnvelopeId,
        month: Month,
        update: MonthConfigUpdate,
    ) -> LedgerResult<MonthConfig> {
        let storage = self.reader;
        let envelope = storage
            .budgets
            .get_envelope(envelope_id)?
            .ok_or_else(|| LedgerError::envelope_not_found(envelope_id.to_string()))?;

        let existing = storage.month_configs.get(envelope_id, month)?;
        let mut config = existing
            .clone()
            .unwrap_or_else(|| MonthConfig::new(envelope_id, month));

        if let Some(allocation) = update.allocation {
            config.set_allocation(allocation);
        }
        if let Some(mode) = update.overspend_mode {
            config.set_overspend_mode(mode);
        }
        if let Some(note) = update.note {
            config.note = note;
        }

        storage.month_configs.upsert(config.clone())?;
        storage.month_configs.save()?;

        let entity_id = format!("{}:{}", envelope_id, month);
        match existing {
            Some(before) => storage.log_update(
                EntityType::MonthConfig,
                entity_id,
                Some(envelope.name.clone()),
                &before,
                &config,
            )?,
            None => storage.log_create(
                EntityType::MonthConfig,
                entity_id,
                Some(envelope.name.clone()),
                &config,
            )?,
        }

        info!(
            envelope = %envelope_id,
            %month,
            allocation = %config.allocation,
            mode = %config.overspend_mode,
            "set month config"
        );
        Ok(config)
    }

    /// Tombstone the month config of an envelope for `month`, if any
    pub fn delete_month_config(
        &self,
        envelope_id: EnvelopeId,
        month: Month,
    ) -> LedgerResult<Option<MonthConfig>> {
        let storage = self.reader;
        let removed = storage.month_configs.delete(envelope_id, month)?;

        if let Some(config) = &removed {
            storage.month_configs.save()?;
            storage.log_delete(
                EntityType::MonthConfig,
                format!("{}:{}", envelope_id, month),
                None,
                config,
            )?;
        }

        Ok(removed)
    }
}
