//! Transaction views over the state tables

use redb::{ReadTransaction, ReadableTable, TableError, WriteTransaction};

use super::{Namespace, NamespaceKind, StringTable};
use crate::error::StoreError;
use crate::types::{AppName, NodeMapping, ThingId, User, VendorThingId};

/// Read-only snapshot of the state store
pub struct StateReader {
    txn: ReadTransaction,
}

impl StateReader {
    pub(super) fn new(txn: ReadTransaction) -> Self {
        Self { txn }
    }

    /// Stored local gateway token of `app`
    pub fn token(&self, app: &AppName) -> Result<Option<String>, StoreError> {
        self.get(&shared(NamespaceKind::Tokens, app), app.as_str())
    }

    /// Stored gateway thing-id of `app`
    pub fn gateway_id(&self, app: &AppName) -> Result<Option<ThingId>, StoreError> {
        Ok(self
            .get(&shared(NamespaceKind::GatewayIds, app), app.as_str())?
            .map(ThingId::from))
    }

    /// Stored login user of `app`
    pub fn user(&self, app: &AppName) -> Result<Option<User>, StoreError> {
        let ns = shared(NamespaceKind::Users, app);
        match self.get(&ns, app.as_str())? {
            Some(raw) => decode_user(&ns, app, &raw).map(Some),
            None => Ok(None),
        }
    }

    /// Thing-id mapped to `vendor_thing_id` in `nodes:<app>`
    pub fn node_thing_id(
        &self,
        app: &AppName,
        vendor_thing_id: &VendorThingId,
    ) -> Result<Option<ThingId>, StoreError> {
        Ok(self
            .get(&nodes(app), vendor_thing_id.as_str())?
            .map(ThingId::from))
    }

    /// Every mapping in `nodes:<app>`, ordered by vendor-id
    pub fn nodes(&self, app: &AppName) -> Result<Vec<NodeMapping>, StoreError> {
        Ok(self
            .entries(&nodes(app))?
            .into_iter()
            .map(|(vid, id)| NodeMapping {
                vendor_thing_id: VendorThingId::from(vid),
                thing_id: ThingId::from(id),
            })
            .collect())
    }

    /// Raw key/value pairs of a namespace, ordered by key
    ///
    /// A namespace that was never written lists as empty.
    pub fn entries(&self, ns: &Namespace) -> Result<Vec<(String, String)>, StoreError> {
        let name = ns.table_name();
        let table = match self.txn.open_table(StringTable::new(&name)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            entries.push((key.value().to_string(), value.value().to_string()));
        }
        Ok(entries)
    }

    fn get(&self, ns: &Namespace, key: &str) -> Result<Option<String>, StoreError> {
        let name = ns.table_name();
        let table = match self.txn.open_table(StringTable::new(&name)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value = table.get(key)?.map(|v| v.value().to_string());
        tracing::debug!(namespace = %name, key, found = value.is_some(), "store read");
        Ok(value)
    }
}

/// Mutations inside a read-write transaction
///
/// Nothing written here is visible to other transactions until
/// [`StateStore::update`](super::StateStore::update) commits.
pub struct StateWriter<'txn> {
    txn: &'txn WriteTransaction,
}

impl<'txn> StateWriter<'txn> {
    pub(super) fn new(txn: &'txn WriteTransaction) -> Self {
        Self { txn }
    }

    /// Record the local gateway token of `app`
    pub fn put_token(&self, app: &AppName, token: &str) -> Result<(), StoreError> {
        self.put(&shared(NamespaceKind::Tokens, app), app.as_str(), token)
    }

    /// Record the gateway thing-id of `app`
    pub fn put_gateway_id(&self, app: &AppName, thing_id: &ThingId) -> Result<(), StoreError> {
        self.put(
            &shared(NamespaceKind::GatewayIds, app),
            app.as_str(),
            thing_id.as_str(),
        )
    }

    /// Record the login user of `app`
    pub fn put_user(&self, app: &AppName, user: &User) -> Result<(), StoreError> {
        let ns = shared(NamespaceKind::Users, app);
        let json = serde_json::to_string(user).map_err(|e| StoreError::Corrupt {
            namespace: ns.table_name(),
            key: app.to_string(),
            message: e.to_string(),
        })?;
        self.put(&ns, app.as_str(), &json)
    }

    /// Map `vendor_thing_id` to `thing_id` in `nodes:<app>`
    pub fn put_node(
        &self,
        app: &AppName,
        vendor_thing_id: &VendorThingId,
        thing_id: &ThingId,
    ) -> Result<(), StoreError> {
        self.put(&nodes(app), vendor_thing_id.as_str(), thing_id.as_str())
    }

    /// Remove a mapping from `nodes:<app>`, returning the thing-id it held
    ///
    /// Removing a vendor-id that was never mapped is not an error.
    pub fn remove_node(
        &self,
        app: &AppName,
        vendor_thing_id: &VendorThingId,
    ) -> Result<Option<ThingId>, StoreError> {
        let name = nodes(app).table_name();
        let mut table = self.txn.open_table(StringTable::new(&name))?;
        let removed = table
            .remove(vendor_thing_id.as_str())?
            .map(|v| ThingId::new(v.value()));
        tracing::debug!(namespace = %name, key = %vendor_thing_id, found = removed.is_some(), "store remove");
        Ok(removed)
    }

    fn put(&self, ns: &Namespace, key: &str, value: &str) -> Result<(), StoreError> {
        let name = ns.table_name();
        let mut table = self.txn.open_table(StringTable::new(&name))?;
        table.insert(key, value)?;
        tracing::debug!(namespace = %name, key, "store write");
        Ok(())
    }
}

fn shared(kind: NamespaceKind, app: &AppName) -> Namespace {
    Namespace::new(kind, app.clone())
}

fn nodes(app: &AppName) -> Namespace {
    Namespace::new(NamespaceKind::Nodes, app.clone())
}

fn decode_user(ns: &Namespace, app: &AppName, raw: &str) -> Result<User, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Corrupt {
        namespace: ns.table_name(),
        key: app.to_string(),
        message: e.to_string(),
    })
}
