mod add;
mod context;
mod install;
mod resolve;

pub(crate) use add::{cmd_add, cmd_apply};
pub(crate) use install::cmd_install;
pub(crate) use resolve::cmd_resolve;
