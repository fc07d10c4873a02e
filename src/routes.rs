//! Path templates for the wallet UI

pub const ACCOUNT_ID_PLACEHOLDER: &str = ":accountId";

fn account_path(prefix: &str, account_id: Option<&str>) -> String {
    format!("{}/{}", prefix, account_id.unwrap_or(ACCOUNT_ID_PLACEHOLDER))
}

pub fn approve_tx() -> String {
    "/tx".to_string()
}

pub fn login() -> String {
    "/login".to_string()
}

pub fn approve_connection() -> String {
    "/connection".to_string()
}

pub fn setup() -> String {
    "/setup".to_string()
}

pub fn change_password() -> String {
    "/change-password".to_string()
}

pub fn connected_sites() -> String {
    "/connected-sites".to_string()
}

pub fn view_account_list() -> String {
    "/accounts/view".to_string()
}

pub fn view_account_mnemonic(account_id: Option<&str>) -> String {
    account_path("/accounts/mnemonic", account_id)
}

pub fn view_account(account_id: Option<&str>) -> String {
    account_path("/accounts/view", account_id)
}

pub fn delete_account(account_id: Option<&str>) -> String {
    account_path("/accounts/delete", account_id)
}

pub fn rename_account(account_id: Option<&str>) -> String {
    account_path("/accounts/rename", account_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    ApproveTx,
    Login,
    ApproveConnection,
    Setup,
    ChangePassword,
    ConnectedSites,
    ViewAccountList,
    ViewAccountMnemonic,
    ViewAccount,
    DeleteAccount,
    RenameAccount,
}

impl Route {
    pub const ALL: [Route; 11] = [
        Route::ApproveTx,
        Route::Login,
        Route::ApproveConnection,
        Route::Setup,
        Route::ChangePassword,
        Route::ConnectedSites,
        Route::ViewAccountList,
        Route::ViewAccountMnemonic,
        Route::ViewAccount,
        Route::DeleteAccount,
        Route::RenameAccount,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Route::ApproveTx => "approve-tx",
            Route::Login => "login",
            Route::ApproveConnection => "approve-connection",
            Route::Setup => "setup",
            Route::ChangePassword => "change-password",
            Route::ConnectedSites => "connected-sites",
            Route::ViewAccountList => "view-account-list",
            Route::ViewAccountMnemonic => "view-account-mnemonic",
            Route::ViewAccount => "view-account",
            Route::DeleteAccount => "delete-account",
            Route::RenameAccount => "rename-account",
        }
    }

    /// Path with `:accountId` left in place for parameterized routes
    pub fn template(&self) -> String {
        self.path(None)
    }

    /// `account_id` is ignored by routes without a parameter
    pub fn path(&self, account_id: Option<&str>) -> String {
        match self {
            Route::ApproveTx => approve_tx(),
            Route::Login => login(),
            Route::ApproveConnection => approve_connection(),
            Route::Setup => setup(),
            Route::ChangePassword => change_password(),
            Route::ConnectedSites => connected_sites(),
            Route::ViewAccountList => view_account_list(),
            Route::ViewAccountMnemonic => view_account_mnemonic(account_id),
            Route::ViewAccount => view_account(account_id),
            Route::DeleteAccount => delete_account(account_id),
            Route::RenameAccount => rename_account(account_id),
        }
    }

    pub fn is_parameterized(&self) -> bool {
        self.template().contains(ACCOUNT_ID_PLACEHOLDER)
    }
}
