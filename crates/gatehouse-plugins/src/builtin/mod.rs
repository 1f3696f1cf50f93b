//! Providers compiled into the binary.

pub mod users;

use crate::layout::PluginLayout;
use crate::provider::PluginExports;

/// The built-in plugin tree.
///
/// ```text
/// Users/
///   signup
///   login
///   update
/// ```
pub fn layout() -> PluginLayout {
    PluginLayout::new().dir("Users", |users| {
        users
            .file("signup", PluginExports::from_plugin(users::Signup))
            .file("login", PluginExports::from_plugin(users::Login))
            .file("update", PluginExports::from_plugin(users::Update))
    })
}
