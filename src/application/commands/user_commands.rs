//! User Commands

use crate::application::ports::UserProfile;

/// 注册（或刷新）用户命令
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub profile: UserProfile,
}
