use futures::{Stream, StreamExt};

/// Upper bound on up-front allocation; larger limits grow as items arrive.
const MAX_PREALLOC: usize = 64;

/// Pull items from `stream` in order until it ends or `limit` are collected.
///
/// Never polls for the item after the `limit`-th, whatever the source still
/// has to offer. The first error ends draining and is returned as-is; items
/// collected before it are dropped.
pub async fn drain<S, T, E>(stream: S, limit: usize) -> Result<Vec<T>, E>
where
    S: Stream<Item = Result<T, E>>,
{
    let mut stream = std::pin::pin!(stream);
    let mut collected = Vec::with_capacity(limit.min(MAX_PREALLOC));

    while collected.len() < limit {
        match stream.next().await {
            Some(Ok(item)) => collected.push(item),
            Some(Err(err)) => return Err(err),
            None => break,
        }
    }

    Ok(collected)
}
