use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::client::{ClientKey, ClientProfile};
use crate::models::matchmaking::QueuedClient;
use crate::repositories::errors::queue_repository_errors::QueueRepositoryError;

/// A waiting client linked to its neighbours in join order.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolNode {
    pub profile: ClientProfile,
    pub joined_at: DateTime<Utc>,
    prev: Option<ClientKey>,
    next: Option<ClientKey>,
}

impl PoolNode {
    pub fn client_key(&self) -> &str {
        &self.profile.client_key
    }

    pub fn prev_key(&self) -> Option<&str> {
        self.prev.as_deref()
    }

    pub fn next_key(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn to_queued_client(&self) -> QueuedClient {
        QueuedClient::new(self.profile.clone(), self.joined_at)
    }
}

/// Clients awaiting a match: a doubly linked list threaded through a map
/// keyed by client, so appends and removals by key are O(1).
///
/// Every key in `nodes` is reachable from `head` and every reachable node is
/// indexed.
#[derive(Debug, Default)]
pub struct WaitingPool {
    nodes: HashMap<ClientKey, PoolNode>,
    head: Option<ClientKey>,
    tail: Option<ClientKey>,
}

impl WaitingPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_client(
        &mut self,
        profile: ClientProfile,
        joined_at: DateTime<Utc>,
    ) -> Result<(), QueueRepositoryError> {
        if self.nodes.contains_key(&profile.client_key) {
            return Err(QueueRepositoryError::AlreadyQueued);
        }

        let key = profile.client_key.clone();
        let node = PoolNode {
            profile,
            joined_at,
            prev: self.tail.clone(),
            next: None,
        };

        match self.tail.as_ref().and_then(|tail| self.nodes.get_mut(tail)) {
            Some(tail_node) => tail_node.next = Some(key.clone()),
            None => self.head = Some(key.clone()),
        }

        self.tail = Some(key.clone());
        self.nodes.insert(key, node);

        Ok(())
    }

    /// Links the client in behind every node that joined no later than
    /// `joined_at`, so a returning client keeps its place in the walk. The
    /// search starts at the tail.
    pub fn insert_by_join_time(
        &mut self,
        profile: ClientProfile,
        joined_at: DateTime<Utc>,
    ) -> Result<(), QueueRepositoryError> {
        if self.nodes.contains_key(&profile.client_key) {
            return Err(QueueRepositoryError::AlreadyQueued);
        }

        let mut anchor = self.tail();
        while let Some(node) = anchor {
            if node.joined_at <= joined_at {
                break;
            }
            anchor = node.prev_key().and_then(|key| self.nodes.get(key));
        }

        let prev = anchor.map(|node| node.profile.client_key.clone());
        let next = match &prev {
            Some(prev_key) => self.nodes.get(prev_key).and_then(|node| node.next.clone()),
            None => self.head.clone(),
        };

        let key = profile.client_key.clone();
        match prev.as_ref().and_then(|prev_key| self.nodes.get_mut(prev_key)) {
            Some(prev_node) => prev_node.next = Some(key.clone()),
            None => self.head = Some(key.clone()),
        }
        match next.as_ref().and_then(|next_key| self.nodes.get_mut(next_key)) {
            Some(next_node) => next_node.prev = Some(key.clone()),
            None => self.tail = Some(key.clone()),
        }

        self.nodes.insert(
            key,
            PoolNode {
                profile,
                joined_at,
                prev,
                next,
            },
        );

        Ok(())
    }

    pub fn remove_client(&mut self, client_key: &str) -> Result<PoolNode, QueueRepositoryError> {
        let node = self
            .nodes
            .remove(client_key)
            .ok_or(QueueRepositoryError::NotQueued)?;

        match node.prev.as_ref().and_then(|prev| self.nodes.get_mut(prev)) {
            Some(prev_node) => prev_node.next = node.next.clone(),
            None => self.head = node.next.clone(),
        }

        match node.next.as_ref().and_then(|next| self.nodes.get_mut(next)) {
            Some(next_node) => next_node.prev = node.prev.clone(),
            None => self.tail = node.prev.clone(),
        }

        Ok(node)
    }

    pub fn head(&self) -> Option<&PoolNode> {
        self.head.as_ref().and_then(|key| self.nodes.get(key))
    }

    pub fn tail(&self) -> Option<&PoolNode> {
        self.tail.as_ref().and_then(|key| self.nodes.get(key))
    }

    pub fn node_by_key(&self, client_key: &str) -> Option<&PoolNode> {
        self.nodes.get(client_key)
    }

    pub fn next(&self, node: &PoolNode) -> Option<&PoolNode> {
        node.next.as_ref().and_then(|key| self.nodes.get(key))
    }

    pub fn contains(&self, client_key: &str) -> bool {
        self.nodes.contains_key(client_key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walks the pool from head to tail.
    pub fn iter(&self) -> PoolIter<'_> {
        PoolIter {
            pool: self,
            current: self.head(),
        }
    }
}

pub struct PoolIter<'a> {
    pool: &'a WaitingPool,
    current: Option<&'a PoolNode>,
}

impl<'a> Iterator for PoolIter<'a> {
    type Item = &'a PoolNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        self.current = self.pool.next(node);
        Some(node)
    }
}
