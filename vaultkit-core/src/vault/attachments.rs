//! Attachment records: metadata plus an opaque encrypted payload.
//!
//! Unlike item payloads, attachment bytes are not serialized; the payload
//! is encrypted as-is, so large files pay no codec overhead.

use vaultkit_store::{Bucket, BucketRead};
use zeroize::Zeroizing;

use crate::codec;
use crate::error::{VaultError, VaultResult};
use crate::records::{AttachmentMeta, RecordId};

use super::{get_record, get_value, put_record, Vault};

impl Vault {
    /// Creates or updates an attachment, writing metadata and payload in
    /// one transaction.
    ///
    /// The vault assigns the id and creation time on first put, refreshes
    /// the update time on every put and derives `file_size` from `data`.
    /// The completed metadata is returned.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidArgument`] when `file_name` is blank
    /// and [`VaultError::Locked`] when the vault is locked.
    pub fn attachment_put(
        &mut self,
        mut meta: AttachmentMeta,
        data: &[u8],
    ) -> VaultResult<AttachmentMeta> {
        if meta.file_name.trim().is_empty() {
            return Err(VaultError::InvalidArgument("file name must not be blank"));
        }
        let now = self.clock.now_unix();
        let id = meta.id.get_or_insert_with(RecordId::generate).clone();
        if meta.created_at == 0 {
            meta.created_at = now;
        }
        meta.updated_at = now;
        meta.file_size = data.len() as u64;

        let txn = self.store.write_txn().map_err(VaultError::Write)?;
        put_record(
            &self.keys,
            &txn,
            Bucket::AttachmentsMeta,
            id.as_bytes(),
            &meta,
        )?;
        let sealed = self.keys.encrypt(data)?;
        txn.put(Bucket::AttachmentsData, id.as_bytes(), &sealed)
            .map_err(VaultError::Write)?;
        txn.commit().map_err(VaultError::Write)?;
        tracing::debug!(attachment = %id, size = meta.file_size, "attachment stored");
        Ok(meta)
    }

    /// Returns the metadata of one attachment, soft-deleted ones included.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] for an unknown id and
    /// [`VaultError::Locked`] when the vault is locked.
    pub fn attachment_meta_get(&self, id: &RecordId) -> VaultResult<AttachmentMeta> {
        let txn = self.store.read_txn().map_err(VaultError::Read)?;
        get_record(&self.keys, &txn, Bucket::AttachmentsMeta, id.as_bytes())
    }

    /// Returns the decrypted payload of one attachment.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] for an unknown id and
    /// [`VaultError::Locked`] when the vault is locked.
    pub fn attachment_data_get(&self, id: &RecordId) -> VaultResult<Vec<u8>> {
        let txn = self.store.read_txn().map_err(VaultError::Read)?;
        let sealed = get_value(&txn, Bucket::AttachmentsData, id.as_bytes())?;
        self.keys.decrypt(&sealed)
    }

    /// Soft-deletes an attachment, replacing the payload with the
    /// encryption of zero bytes so the file content is unrecoverable
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::NotFound`] for an unknown id and
    /// [`VaultError::Locked`] when the vault is locked.
    pub fn attachment_delete(&mut self, id: &RecordId) -> VaultResult<()> {
        let now = self.clock.now_unix();
        let txn = self.store.write_txn().map_err(VaultError::Write)?;
        let _: AttachmentMeta = get_record(&self.keys, &txn, Bucket::AttachmentsMeta, id.as_bytes())?;

        let tombstone = AttachmentMeta {
            id: Some(id.clone()),
            updated_at: now,
            deleted: true,
            ..AttachmentMeta::default()
        };
        put_record(
            &self.keys,
            &txn,
            Bucket::AttachmentsMeta,
            id.as_bytes(),
            &tombstone,
        )?;
        let shredded = self.keys.encrypt(&[])?;
        txn.put(Bucket::AttachmentsData, id.as_bytes(), &shredded)
            .map_err(VaultError::Write)?;
        txn.commit().map_err(VaultError::Write)?;
        tracing::debug!(attachment = %id, "attachment soft-deleted");
        Ok(())
    }

    /// Hard-deletes every soft-deleted attachment. Called by
    /// [`Vault::vacuum`].
    pub(crate) fn attachment_vacuum(&mut self) -> VaultResult<()> {
        let txn = self.store.write_txn().map_err(VaultError::Write)?;
        let mut entries = Vec::new();
        txn.for_each(Bucket::AttachmentsMeta, |key, value| {
            entries.push((key.to_vec(), value.to_vec()));
            Ok(())
        })
        .map_err(VaultError::Read)?;

        let mut removed = 0_usize;
        for (key, ciphertext) in entries {
            let plaintext = Zeroizing::new(self.keys.decrypt(&ciphertext)?);
            let meta: AttachmentMeta = codec::decode(&plaintext)?;
            if !meta.deleted {
                continue;
            }
            txn.delete(Bucket::AttachmentsMeta, &key)
                .map_err(VaultError::Write)?;
            txn.delete(Bucket::AttachmentsData, &key)
                .map_err(VaultError::Write)?;
            removed += 1;
        }
        txn.commit().map_err(VaultError::Write)?;
        if removed > 0 {
            tracing::debug!(removed, "attachments vacuumed");
        }
        Ok(())
    }
}
