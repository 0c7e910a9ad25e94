//! Item records: encrypted put/get, soft delete, listing, vacuum.

use vaultkit_store::{Bucket, BucketRead};
use zeroize::Zeroizing;

use crate::codec;
use crate::error::{VaultError, VaultResult};
use crate::records::{ItemData, ItemMeta, RecordId};

use super::{get_record, put_record, Vault};

impl Vault {
    /// Creates or updates an item, writing metadata and payload in one
    /// transaction.
    ///
    /// On first put the vault assigns the id and the creation time; on every
    /// put it refreshes the update time. The completed metadata is returned.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Locked`] when the vault is locked.
    pub fn item_put(&mut self, mut meta: ItemMeta, data: &ItemData) -> VaultResult<ItemMeta> {
        let now = self.clock.now_unix();
        let id = meta.id.get_or_insert_with(RecordId::generate).clone();
        if meta.created_at == 0 {
            meta.created_at = now;
        }
        meta.updated_at = now;

        let txn = self.store.write_txn().map_err(VaultError::Write)?;
        put_record(&self.keys, &txn, Bucket::ItemsMeta, id.as_bytes(), &meta)?;
        put_record(&self.keys, &txn, Bucket::ItemsData, id.as_bytes(), data)?;
        txn.commit().map_err(VaultError::Write)?;
        tracing::debug!(item = %id, "item stored");
        Ok(meta)
    }

    /// Returns the metadata of one item, soft-deleted ones included.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] for an unknown id and
    /// [`VaultError::Locked`] when the vault is locked.
    pub fn item_meta_get(&self, id: &RecordId) -> VaultResult<ItemMeta> {
        let txn = self.store.read_txn().map_err(VaultError::Read)?;
        get_record(&self.keys, &txn, Bucket::ItemsMeta, id.as_bytes())
    }

    /// Returns the decrypted payload of one item.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] for an unknown id and
    /// [`VaultError::Locked`] when the vault is locked.
    pub fn item_data_get(&self, id: &RecordId) -> VaultResult<ItemData> {
        let txn = self.store.read_txn().map_err(VaultError::Read)?;
        get_record(&self.keys, &txn, Bucket::ItemsData, id.as_bytes())
    }

    /// Soft-deletes an item.
    ///
    /// The metadata is replaced by a tombstone and the payload by the
    /// encryption of an empty payload, so the plaintext is unreachable even
    /// before [`Vault::vacuum`] reclaims the records.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] for an unknown id and
    /// [`VaultError::Locked`] when the vault is locked.
    pub fn item_delete(&mut self, id: &RecordId) -> VaultResult<()> {
        let now = self.clock.now_unix();
        let txn = self.store.write_txn().map_err(VaultError::Write)?;
        let _: ItemMeta = get_record(&self.keys, &txn, Bucket::ItemsMeta, id.as_bytes())?;

        let tombstone = ItemMeta {
            id: Some(id.clone()),
            updated_at: now,
            deleted: true,
            ..ItemMeta::default()
        };
        put_record(&self.keys, &txn, Bucket::ItemsMeta, id.as_bytes(), &tombstone)?;
        put_record(
            &self.keys,
            &txn,
            Bucket::ItemsData,
            id.as_bytes(),
            &ItemData::default(),
        )?;
        txn.commit().map_err(VaultError::Write)?;
        tracing::debug!(item = %id, "item soft-deleted");
        Ok(())
    }

    /// Lists the metadata of every non-deleted item.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Locked`] when the vault is locked and items
    /// exist.
    pub fn item_list(&self) -> VaultResult<Vec<ItemMeta>> {
        self.item_filter("")
    }

    /// Lists the metadata of non-deleted items whose title contains
    /// `filter` as a case-sensitive substring. An empty filter matches
    /// every item.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Locked`] when the vault is locked and items
    /// exist.
    pub fn item_filter(&self, filter: &str) -> VaultResult<Vec<ItemMeta>> {
        let txn = self.store.read_txn().map_err(VaultError::Read)?;
        let mut encrypted = Vec::new();
        txn.for_each(Bucket::ItemsMeta, |_, value| {
            encrypted.push(value.to_vec());
            Ok(())
        })
        .map_err(VaultError::Read)?;

        let mut list = Vec::new();
        for ciphertext in encrypted {
            let plaintext = Zeroizing::new(self.keys.decrypt(&ciphertext)?);
            let meta: ItemMeta = codec::decode(&plaintext)?;
            if meta.deleted {
                continue;
            }
            if filter.is_empty() || meta.title.contains(filter) {
                list.push(meta);
            }
        }
        Ok(list)
    }

    /// Hard-deletes every soft-deleted item. Called by [`Vault::vacuum`].
    pub(crate) fn item_vacuum(&mut self) -> VaultResult<()> {
        let txn = self.store.write_txn().map_err(VaultError::Write)?;
        let mut entries = Vec::new();
        txn.for_each(Bucket::ItemsMeta, |key, value| {
            entries.push((key.to_vec(), value.to_vec()));
            Ok(())
        })
        .map_err(VaultError::Read)?;

        let mut removed = 0_usize;
        for (key, ciphertext) in entries {
            let plaintext = Zeroizing::new(self.keys.decrypt(&ciphertext)?);
            let meta: ItemMeta = codec::decode(&plaintext)?;
            if !meta.deleted {
                continue;
            }
            txn.delete(Bucket::ItemsMeta, &key).map_err(VaultError::Write)?;
            txn.delete(Bucket::ItemsData, &key).map_err(VaultError::Write)?;
            removed += 1;
        }
        txn.commit().map_err(VaultError::Write)?;
        if removed > 0 {
            tracing::debug!(removed, "items vacuumed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::open_unlocked_vault;
    use super::*;
    use crate::clock::test_support::FixedClock;
    use crate::records::{Field, FieldKind, ItemKind};

    fn login_item() -> (ItemMeta, ItemData) {
        let meta = ItemMeta {
            title: "Mail account".to_owned(),
            kind: ItemKind::Login,
            ..ItemMeta::default()
        };
        let data = ItemData {
            fields: vec![
                Field {
                    order: 0,
                    title: "username".to_owned(),
                    kind: FieldKind::Text,
                    value: b"me@example.com".to_vec(),
                },
                Field {
                    order: 1,
                    title: "password".to_owned(),
                    kind: FieldKind::Secret,
                    value: b"hunter2".to_vec(),
                },
            ],
        };
        (meta, data)
    }

    #[test]
    fn test_put_assigns_id_and_timestamps() {
        let clock = FixedClock::at(12_345);
        let mut vault = open_unlocked_vault(&clock);
        let (meta, data) = login_item();

        let stored = vault.item_put(meta, &data).expect("put item");
        assert!(stored.id.is_some());
        assert_eq!(stored.created_at, 12_345);
        assert_eq!(stored.updated_at, 12_345);
    }

    #[test]
    fn test_put_roundtrips_meta_and_data() {
        let clock = FixedClock::at(12_345);
        let mut vault = open_unlocked_vault(&clock);
        let (meta, data) = login_item();

        let stored = vault.item_put(meta, &data).expect("put item");
        let id = stored.id.clone().expect("id");

        let loaded_meta = vault.item_meta_get(&id).expect("meta");
        assert_eq!(loaded_meta, stored);

        let loaded_data = vault.item_data_get(&id).expect("data");
        assert_eq!(loaded_data, data);
    }

    #[test]
    fn test_update_preserves_created_at() {
        let clock = FixedClock::at(12_345);
        let mut vault = open_unlocked_vault(&clock);
        let (meta, data) = login_item();
        let stored = vault.item_put(meta, &data).expect("first put");

        clock.set(23_456);
        let mut updated = stored.clone();
        updated.title = "Mail account (renamed)".to_owned();
        let stored_again = vault.item_put(updated, &data).expect("second put");

        assert_eq!(stored_again.id, stored.id);
        assert_eq!(stored_again.created_at, 12_345);
        assert_eq!(stored_again.updated_at, 23_456);
    }

    #[test]
    fn test_get_unknown_id_fails() {
        let clock = FixedClock::at(12_345);
        let vault = open_unlocked_vault(&clock);
        let err = vault
            .item_meta_get(&RecordId::generate())
            .expect_err("unknown id");
        assert!(matches!(err, VaultError::NotFound));
    }

    #[test]
    fn test_delete_leaves_tombstone_and_empty_payload() {
        let clock = FixedClock::at(12_345);
        let mut vault = open_unlocked_vault(&clock);
        let (meta, data) = login_item();
        let stored = vault.item_put(meta, &data).expect("put item");
        let id = stored.id.expect("id");

        clock.set(23_456);
        vault.item_delete(&id).expect("delete item");

        let tombstone = vault.item_meta_get(&id).expect("tombstone readable");
        assert!(tombstone.deleted);
        assert_eq!(tombstone.updated_at, 23_456);
        assert!(tombstone.title.is_empty());
        assert_eq!(tombstone.created_at, 0);

        let payload = vault.item_data_get(&id).expect("payload readable");
        assert!(payload.fields.is_empty());
    }

    #[test]
    fn test_delete_unknown_id_fails() {
        let clock = FixedClock::at(12_345);
        let mut vault = open_unlocked_vault(&clock);
        let err = vault
            .item_delete(&RecordId::generate())
            .expect_err("unknown id");
        assert!(matches!(err, VaultError::NotFound));
    }

    #[test]
    fn test_list_skips_deleted() {
        let clock = FixedClock::at(12_345);
        let mut vault = open_unlocked_vault(&clock);
        let (meta, data) = login_item();
        let first = vault.item_put(meta, &data).expect("put first");
        let second = vault
            .item_put(
                ItemMeta {
                    title: "Backup codes".to_owned(),
                    kind: ItemKind::SecureNote,
                    ..ItemMeta::default()
                },
                &ItemData::default(),
            )
            .expect("put second");

        vault
            .item_delete(&second.id.expect("second id"))
            .expect("delete second");

        let listed = vault.item_list().expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, first.id);
    }

    #[test]
    fn test_filter_is_case_sensitive_substring() {
        let clock = FixedClock::at(12_345);
        let mut vault = open_unlocked_vault(&clock);
        for title in ["Mail account", "mail backup", "Bank login"] {
            vault
                .item_put(
                    ItemMeta {
                        title: title.to_owned(),
                        ..ItemMeta::default()
                    },
                    &ItemData::default(),
                )
                .expect("put item");
        }

        let hits = vault.item_filter("Mail").expect("filter Mail");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Mail account");

        let hits = vault.item_filter("ail").expect("filter ail");
        assert_eq!(hits.len(), 2);

        let hits = vault.item_filter("").expect("empty filter");
        assert_eq!(hits.len(), 3);

        let hits = vault.item_filter("missing").expect("no hits");
        assert!(hits.is_empty());
    }

    #[test]
    fn test_list_empty_vault() {
        let clock = FixedClock::at(12_345);
        let vault = open_unlocked_vault(&clock);
        assert!(vault.item_list().expect("list").is_empty());
    }

    #[test]
    fn test_vacuum_removes_only_deleted() {
        let clock = FixedClock::at(12_345);
        let mut vault = open_unlocked_vault(&clock);
        let (meta, data) = login_item();
        let kept = vault.item_put(meta, &data).expect("put kept");
        let doomed = vault
            .item_put(
                ItemMeta {
                    title: "doomed".to_owned(),
                    ..ItemMeta::default()
                },
                &ItemData::default(),
            )
            .expect("put doomed");

        let doomed_id = doomed.id.expect("doomed id");
        vault.item_delete(&doomed_id).expect("delete");
        vault.item_vacuum().expect("vacuum");

        let err = vault.item_meta_get(&doomed_id).expect_err("meta gone");
        assert!(matches!(err, VaultError::NotFound));
        let err = vault.item_data_get(&doomed_id).expect_err("data gone");
        assert!(matches!(err, VaultError::NotFound));

        let kept_id = kept.id.expect("kept id");
        vault.item_meta_get(&kept_id).expect("kept meta");
        vault.item_data_get(&kept_id).expect("kept data");
    }
}
