//! Sled-backed record store
//!
//! Two trees: `nodes` maps the big-endian id to the bincode record, `paths`
//! maps the record path to its id. Every mutation touches both inside one
//! transaction so the path index never disagrees with the records.

use super::{child_prefix, resolve_parent_id, FileSystemNode, FindOptions, RecordStore};
use crate::error::StorageError;
use crate::types::{NodeId, NodeKind};
use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult, TransactionError, Transactional,
};
use std::path::Path;

pub struct SledRecordStore {
    db: sled::Db,
    nodes: sled::Tree,
    paths: sled::Tree,
    upload_path: String,
}

fn id_key(id: NodeId) -> [u8; 8] {
    id.0.to_be_bytes()
}

fn decode(raw: &[u8]) -> Result<FileSystemNode, StorageError> {
    Ok(bincode::deserialize(raw)?)
}

fn abort(err: StorageError) -> ConflictableTransactionError<StorageError> {
    ConflictableTransactionError::Abort(err)
}

fn from_tx(err: TransactionError<StorageError>) -> StorageError {
    match err {
        TransactionError::Abort(e) => e,
        TransactionError::Storage(e) => StorageError::Sled(e),
    }
}

impl SledRecordStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &Path, upload_path: impl Into<String>) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        Self::from_db(db, upload_path)
    }

    pub fn from_db(db: sled::Db, upload_path: impl Into<String>) -> Result<Self, StorageError> {
        let nodes = db.open_tree("nodes")?;
        let paths = db.open_tree("paths")?;
        Ok(Self {
            db,
            nodes,
            paths,
            upload_path: upload_path.into(),
        })
    }

    fn lookup_id(&self, path: &str) -> Result<Option<NodeId>, StorageError> {
        match self.paths.get(path.as_bytes())? {
            Some(raw) => {
                let bytes: [u8; 8] = raw
                    .as_ref()
                    .try_into()
                    .map_err(|_| StorageError::Serialization(format!("bad id for {}", path)))?;
                Ok(Some(NodeId(u64::from_be_bytes(bytes))))
            }
            None => Ok(None),
        }
    }

    fn fresh_id(&self) -> Result<NodeId, StorageError> {
        // generate_id starts at zero; zero is reserved for "no record"
        Ok(NodeId(self.db.generate_id()? + 1))
    }

    fn put_new(&self, node: &FileSystemNode) -> Result<(), StorageError> {
        let bytes = bincode::serialize(node)?;
        let key = id_key(node.id);
        (&self.nodes, &self.paths)
            .transaction(|(nodes, paths)| -> ConflictableTransactionResult<(), StorageError> {
                if paths.get(node.path.as_bytes())?.is_some() {
                    return Err(abort(StorageError::DuplicatePath(node.path.clone())));
                }
                paths.insert(node.path.as_bytes(), &key[..])?;
                nodes.insert(&key[..], &bytes[..])?;
                Ok(())
            })
            .map_err(from_tx)
    }
}

impl RecordStore for SledRecordStore {
    fn find_by_path(
        &self,
        path: &str,
        _opts: FindOptions,
    ) -> Result<Option<FileSystemNode>, StorageError> {
        match self.lookup_id(path)? {
            Some(id) => self.find_by_id(id),
            None => Ok(None),
        }
    }

    fn find_by_id(&self, id: NodeId) -> Result<Option<FileSystemNode>, StorageError> {
        match self.nodes.get(id_key(id))? {
            Some(raw) => Ok(Some(decode(&raw)?)),
            None => Ok(None),
        }
    }

    fn find_all_under_prefix(&self, prefix: &str) -> Result<Vec<FileSystemNode>, StorageError> {
        let mut out = Vec::new();
        for item in self.paths.scan_prefix(child_prefix(prefix).as_bytes()) {
            let (_, raw_id) = item?;
            if let Some(raw) = self.nodes.get(raw_id)? {
                out.push(decode(&raw)?);
            }
        }
        Ok(out)
    }

    fn create(&self, path: &str, kind: NodeKind) -> Result<FileSystemNode, StorageError> {
        let parent_id = resolve_parent_id(&self.upload_path, path, |parent| {
            self.lookup_id(parent)
        })?;
        let node = FileSystemNode::new(self.fresh_id()?, parent_id, path, kind);
        self.put_new(&node)?;
        Ok(node)
    }

    fn insert(&self, node: &FileSystemNode) -> Result<FileSystemNode, StorageError> {
        let mut copy = node.clone();
        copy.id = self.fresh_id()?;
        copy.version = 0;
        self.put_new(&copy)?;
        Ok(copy)
    }

    fn save(&self, node: &FileSystemNode) -> Result<FileSystemNode, StorageError> {
        let key = id_key(node.id);
        let mut stored = node.clone();
        stored.version = node.version + 1;
        let bytes = bincode::serialize(&stored)?;

        (&self.nodes, &self.paths)
            .transaction(|(nodes, paths)| -> ConflictableTransactionResult<(), StorageError> {
                let current = match nodes.get(&key[..])? {
                    Some(raw) => decode(&raw).map_err(abort)?,
                    None => return Err(abort(StorageError::RecordNotFound(node.path.clone()))),
                };
                if current.version != node.version {
                    return Err(abort(StorageError::VersionConflict {
                        path: node.path.clone(),
                        expected: node.version,
                        found: current.version,
                    }));
                }
                if current.path != node.path {
                    if let Some(owner) = paths.get(node.path.as_bytes())? {
                        if owner.as_ref() != &key[..] {
                            return Err(abort(StorageError::DuplicatePath(node.path.clone())));
                        }
                    }
                    paths.remove(current.path.as_bytes())?;
                    paths.insert(node.path.as_bytes(), &key[..])?;
                }
                nodes.insert(&key[..], &bytes[..])?;
                Ok(())
            })
            .map_err(from_tx)?;
        Ok(stored)
    }

    fn delete(&self, node: &FileSystemNode) -> Result<(), StorageError> {
        let key = id_key(node.id);
        (&self.nodes, &self.paths)
            .transaction(|(nodes, paths)| -> ConflictableTransactionResult<(), StorageError> {
                if let Some(raw) = nodes.remove(&key[..])? {
                    let current = decode(&raw).map_err(abort)?;
                    if let Some(owner) = paths.get(current.path.as_bytes())? {
                        if owner.as_ref() == &key[..] {
                            paths.remove(current.path.as_bytes())?;
                        }
                    }
                }
                Ok(())
            })
            .map_err(from_tx)
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    fn all(&self) -> Result<Vec<FileSystemNode>, StorageError> {
        self.find_all_under_prefix("")
    }
}
