//! In-memory chart of accounts.
//!
//! Accounts live in an arena keyed by ID, with a code index for ordered and
//! prefix lookups. Parent links are plain IDs, so every hierarchy edit is
//! checked here before it reaches storage.

use std::collections::{BTreeMap, HashMap};

use defter_shared::types::AccountId;
use rust_decimal::Decimal;

use super::code::AccountCode;
use super::error::ChartError;
use super::types::{Account, AccountChanges, Classification, NewAccount};

/// A tenant's chart of accounts.
#[derive(Debug, Clone, Default)]
pub struct ChartOfAccounts {
    accounts: HashMap<AccountId, Account>,
    by_code: BTreeMap<AccountCode, AccountId>,
}

impl ChartOfAccounts {
    /// Creates an empty chart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chart from stored accounts.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCode` if two accounts share a code.
    pub fn from_accounts(accounts: impl IntoIterator<Item = Account>) -> Result<Self, ChartError> {
        let mut chart = Self::new();
        for account in accounts {
            if chart.by_code.contains_key(&account.code) {
                return Err(ChartError::DuplicateCode(account.code.to_string()));
            }
            chart.by_code.insert(account.code.clone(), account.id);
            chart.accounts.insert(account.id, account);
        }
        Ok(chart)
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if the chart has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Looks up an account by ID.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    /// Looks up an account by exact code.
    #[must_use]
    pub fn find_by_code(&self, code: &str) -> Option<&Account> {
        let code = AccountCode::parse(code).ok()?;
        self.by_code.get(&code).and_then(|id| self.accounts.get(id))
    }

    /// All accounts whose code is `prefix` or lies beneath it, in code order.
    pub fn find_by_prefix<'a>(&'a self, prefix: &'a AccountCode) -> impl Iterator<Item = &'a Account> + 'a {
        self.by_code
            .range(prefix.clone()..)
            .take_while(move |(code, _)| code.starts_with(prefix))
            .filter_map(|(_, id)| self.accounts.get(id))
    }

    /// All accounts in code order.
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.by_code.values().filter_map(|id| self.accounts.get(id))
    }

    /// Direct children of an account, in code order.
    #[must_use]
    pub fn children(&self, id: AccountId) -> Vec<&Account> {
        self.iter().filter(|a| a.parent_id == Some(id)).collect()
    }

    /// Ancestors of an account, nearest first.
    #[must_use]
    pub fn ancestors(&self, id: AccountId) -> Vec<&Account> {
        let mut chain = Vec::new();
        let mut current = self.accounts.get(&id).and_then(|a| a.parent_id);
        // Bounded walk: a corrupted parent chain cannot loop forever.
        while let Some(parent_id) = current {
            if chain.len() > self.accounts.len() {
                break;
            }
            let Some(parent) = self.accounts.get(&parent_id) else {
                break;
            };
            chain.push(parent);
            current = parent.parent_id;
        }
        chain
    }

    /// The account named by the first segment of `code`, if it exists.
    #[must_use]
    pub fn top_level_of(&self, code: &AccountCode) -> Option<&Account> {
        self.find_by_code(code.top_level())
    }

    /// Validates and adds a new account.
    ///
    /// Depth is derived from the parent. A sub-ledger parent is rejected.
    ///
    /// # Errors
    ///
    /// Returns `ChartError` if the code is invalid or taken, the name is
    /// blank, or the parent is missing or a sub-ledger account.
    pub fn create(&mut self, input: NewAccount) -> Result<Account, ChartError> {
        let code = AccountCode::parse(&input.code)?;
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ChartError::EmptyName);
        }
        if self.by_code.contains_key(&code) {
            return Err(ChartError::DuplicateCode(code.to_string()));
        }
        let depth = self.depth_under(input.parent_id)?;

        let account = Account {
            id: AccountId::new(),
            code,
            name,
            parent_id: input.parent_id,
            depth,
            classification: input.classification,
            balance_nature: input.balance_nature,
            special_role: input.special_role,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
            is_active: true,
        };

        self.by_code.insert(account.code.clone(), account.id);
        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    /// Applies changes to an account.
    ///
    /// `posted_lines` is the number of voucher lines referencing the account;
    /// a sub-ledger account with postings cannot become an aggregate.
    ///
    /// Returns every account whose stored row changed: the edited account
    /// first, then any descendants whose depth moved with it.
    ///
    /// # Errors
    ///
    /// Returns `ChartError` on an invalid or duplicate code, a missing or
    /// sub-ledger parent, a cycle, or a forbidden classification change.
    pub fn edit(
        &mut self,
        id: AccountId,
        changes: AccountChanges,
        posted_lines: u64,
    ) -> Result<Vec<Account>, ChartError> {
        let current = self
            .accounts
            .get(&id)
            .cloned()
            .ok_or(ChartError::AccountNotFound(id))?;
        let mut updated = current.clone();

        if let Some(raw) = changes.code.as_deref() {
            let code = AccountCode::parse(raw)?;
            if code != current.code && self.by_code.contains_key(&code) {
                return Err(ChartError::DuplicateCode(code.to_string()));
            }
            updated.code = code;
        }

        if let Some(name) = changes.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ChartError::EmptyName);
            }
            updated.name = name;
        }

        if let Some(classification) = changes.classification {
            if classification == Classification::SubLedger
                && current.classification != Classification::SubLedger
            {
                let children = self.children(id).len();
                if children > 0 {
                    return Err(ChartError::HasChildren {
                        code: current.code.to_string(),
                        children,
                    });
                }
            }
            if current.classification == Classification::SubLedger
                && classification != Classification::SubLedger
                && posted_lines > 0
            {
                return Err(ChartError::HasPostedLines {
                    code: current.code.to_string(),
                    lines: posted_lines,
                });
            }
            updated.classification = classification;
        }

        if let Some(nature) = changes.balance_nature {
            updated.balance_nature = nature;
        }
        if let Some(role) = changes.special_role {
            updated.special_role = role;
        }
        if let Some(active) = changes.is_active {
            updated.is_active = active;
        }

        if let Some(parent_id) = changes.parent_id {
            self.check_no_cycle(&updated, parent_id)?;
            updated.parent_id = parent_id;
            updated.depth = self.depth_under(parent_id)?;
        }

        self.by_code.remove(&current.code);
        self.by_code.insert(updated.code.clone(), id);
        self.accounts.insert(id, updated.clone());

        let mut changed = vec![updated];
        if changed[0].depth != current.depth {
            changed.extend(self.recompute_subtree_depths(id));
        }
        Ok(changed)
    }

    /// Removes an account.
    ///
    /// # Errors
    ///
    /// Returns `HasChildren` if any account points at it, then
    /// `HasPostedLines` if `posted_lines` is non-zero.
    pub fn remove(&mut self, id: AccountId, posted_lines: u64) -> Result<Account, ChartError> {
        let account = self.accounts.get(&id).ok_or(ChartError::AccountNotFound(id))?;

        let children = self.children(id).len();
        if children > 0 {
            return Err(ChartError::HasChildren {
                code: account.code.to_string(),
                children,
            });
        }
        if posted_lines > 0 {
            return Err(ChartError::HasPostedLines {
                code: account.code.to_string(),
                lines: posted_lines,
            });
        }

        let account = self
            .accounts
            .remove(&id)
            .ok_or(ChartError::AccountNotFound(id))?;
        self.by_code.remove(&account.code);
        Ok(account)
    }

    fn depth_under(&self, parent_id: Option<AccountId>) -> Result<u32, ChartError> {
        let Some(parent_id) = parent_id else {
            return Ok(1);
        };
        let parent = self
            .accounts
            .get(&parent_id)
            .ok_or(ChartError::ParentNotFound(parent_id))?;
        if !parent.classification.can_have_children() {
            return Err(ChartError::ParentIsSubLedger {
                parent_code: parent.code.to_string(),
            });
        }
        Ok(parent.depth + 1)
    }

    fn check_no_cycle(&self, account: &Account, parent_id: Option<AccountId>) -> Result<(), ChartError> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };
        let parent = self
            .accounts
            .get(&parent_id)
            .ok_or(ChartError::ParentNotFound(parent_id))?;
        let cycle = parent_id == account.id
            || self.ancestors(parent_id).iter().any(|a| a.id == account.id);
        if cycle {
            return Err(ChartError::CycleDetected {
                account_code: account.code.to_string(),
                parent_code: parent.code.to_string(),
            });
        }
        Ok(())
    }

    /// Re-derives depth for every descendant of `root`. Returns those that changed.
    fn recompute_subtree_depths(&mut self, root: AccountId) -> Vec<Account> {
        let mut changed = Vec::new();
        let mut stack = vec![root];
        while let Some(parent_id) = stack.pop() {
            let Some(parent_depth) = self.accounts.get(&parent_id).map(|a| a.depth) else {
                continue;
            };
            let child_ids: Vec<AccountId> = self.children(parent_id).iter().map(|a| a.id).collect();
            for child_id in child_ids {
                if let Some(child) = self.accounts.get_mut(&child_id) {
                    if child.depth != parent_depth + 1 {
                        child.depth = parent_depth + 1;
                        changed.push(child.clone());
                    }
                }
                stack.push(child_id);
            }
        }
        changed
    }
}
