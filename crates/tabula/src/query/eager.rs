use super::Query;
use crate::{predicate, Entity, Error, Result, Value};

use async_recursion::async_recursion;
use indexmap::IndexMap;

/// A relation loaded after the primary query.
#[derive(Debug, Clone)]
pub(super) struct Eager {
    /// Integer column holding the foreign key. On the parent table for
    /// to-one relations, on the related table for to-many relations.
    pub(super) from_key: String,

    pub(super) single: bool,

    /// Loads the related rows. May carry eager loads of its own.
    pub(super) query: Query,
}

/// Checks the foreign key of every eager load, recursively.
pub(super) fn validate(parent: &Query) -> Result<()> {
    for (store_key, eager) in &parent.with {
        let table = match eager.single {
            true => parent.table.schema(),
            false => eager.query.table.schema(),
        };

        let column = table.resolve(&eager.from_key)?;

        if !column.ty.is_integer() {
            return Err(Error::validation(
                Some(&eager.from_key),
                format!(
                    "eager load {store_key:?} needs an integer foreign key, found {} column",
                    column.ty
                ),
            ));
        }

        eager.query.prepare()?;
    }

    Ok(())
}

/// Runs each eager load of `parent` over the loaded `nodes`, one query per
/// load, in the order they were declared.
#[async_recursion]
pub(super) async fn load(parent: &Query, nodes: &mut [Entity]) -> Result<()> {
    for (store_key, eager) in &parent.with {
        match eager.single {
            true => load_single(store_key, eager, nodes).await?,
            false => load_list(store_key, eager, nodes).await?,
        }
    }

    Ok(())
}

async fn load_single(store_key: &str, eager: &Eager, nodes: &mut [Entity]) -> Result<()> {
    // Foreign key -> parents referencing it. NULL keys are skipped.
    let mut index: IndexMap<i64, Vec<usize>> = IndexMap::new();

    for (i, node) in nodes.iter().enumerate() {
        if let Some(fk) = node.row.get(&eager.from_key).and_then(Value::as_i64) {
            index.entry(fk).or_default().push(i);
        }
    }

    if index.is_empty() {
        return Ok(());
    }

    let neighbors = eager
        .query
        .clone()
        .filter(predicate::id_in(index.keys().copied()))
        .load()
        .await?;

    for neighbor in neighbors {
        let parents = index.get(&neighbor.id).ok_or_else(|| {
            Error::invalid_result(format!(
                "unexpected foreign-key {:?} returned {}",
                eager.from_key, neighbor.id
            ))
        })?;

        for &i in parents {
            nodes[i]
                .edges
                .single
                .insert(store_key.to_string(), neighbor.clone());
        }
    }

    Ok(())
}

async fn load_list(store_key: &str, eager: &Eager, nodes: &mut [Entity]) -> Result<()> {
    let mut index: IndexMap<i64, Vec<usize>> = IndexMap::new();

    for (i, node) in nodes.iter_mut().enumerate() {
        index.entry(node.id).or_default().push(i);
        node.edges.list.entry(store_key.to_string()).or_default();
    }

    if index.is_empty() {
        return Ok(());
    }

    let children = eager
        .query
        .clone()
        .filter(predicate::int_in(&eager.from_key, index.keys().copied()))
        .load()
        .await?;

    for child in children {
        let parents = child
            .row
            .get(&eager.from_key)
            .and_then(Value::as_i64)
            .and_then(|fk| index.get(&fk))
            .ok_or_else(|| {
                Error::invalid_result(format!(
                    "unexpected foreign-key {:?} returned {:?}",
                    eager.from_key,
                    child.row.get(&eager.from_key)
                ))
            })?;

        for &i in parents {
            nodes[i]
                .edges
                .list
                .entry(store_key.to_string())
                .or_default()
                .push(child.clone());
        }
    }

    Ok(())
}
