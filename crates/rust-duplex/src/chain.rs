//! Chain builder.
//!
//! A chain is an ordinary [`Command`] whose success action carries the rest
//! of the list as a [`Continuation`](crate::command::OnSuccess::Continuation). Links run
//! strictly in order: the next one is only queued, at the head, once the
//! previous one has matched. The shared callbacks run once per link.

use crate::command::{Command, FailureFn, SuccessFn};
use crate::error::{DuplexError, Result};

/// Fold `commands` into a single command that runs them in order.
///
/// `success` and `failure`, when given, are prepended to every link so they
/// run before the link's own callbacks. Fails if fewer than two commands are
/// supplied.
pub fn build_chain<I>(
    commands: I,
    success: Option<SuccessFn>,
    failure: Option<FailureFn>,
) -> Result<Command>
where
    I: IntoIterator<Item = Command>,
    I::IntoIter: DoubleEndedIterator + ExactSizeIterator,
{
    let links = commands.into_iter();
    let len = links.len();
    if len < 2 {
        return Err(DuplexError::chain_too_short(len));
    }

    let mut built: Option<Command> = None;
    for mut link in links.rev() {
        link.prepend_callbacks(success.clone(), failure.clone());
        if let Some(next) = built.take() {
            let own = std::mem::take(&mut link.success);
            link.success = own.then(next);
        }
        built = Some(link);
    }
    built.ok_or_else(|| DuplexError::chain_too_short(len))
}

/// Iterate the links of a chain, first to last.
pub fn links(head: &Command) -> impl Iterator<Item = &Command> {
    std::iter::successors(Some(head), |cmd| cmd.next())
}

/// Check every link of a chain.
pub(crate) fn for_each_link<F>(head: &Command, check: F) -> Result<()>
where
    F: FnMut(&Command) -> Result<()>,
{
    links(head).try_for_each(check)
}
