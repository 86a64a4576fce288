//! Runs view effects on background tasks.

use std::sync::Arc;

use shdw::ShdwError;
use tokio::sync::mpsc;
use tracing::debug;

use crate::files::read_upload_files;
use crate::session::{ClientFactory, DriveHandle};
use crate::view::{Completion, DriveView, Effect, Outcome};

/// Spawns one task per effect and reports each result as a [`Completion`].
#[derive(Clone)]
pub struct Executor {
    factory: Arc<dyn ClientFactory>,
    tx: mpsc::UnboundedSender<Completion>,
}

impl Executor {
    pub fn new(factory: Arc<dyn ClientFactory>) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { factory, tx }, rx)
    }

    /// Run `effects` against the session `view` currently holds.
    pub fn dispatch(&self, view: &DriveView, effects: Vec<Effect>) {
        if effects.is_empty() {
            return;
        }
        let session = view.session().generation();
        let handle = view.session().handle();

        for effect in effects {
            let factory = Arc::clone(&self.factory);
            let handle = handle.clone();
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let outcome = run_effect(factory.as_ref(), handle, effect).await;
                // Receiver gone means the UI is shutting down.
                let _ = tx.send(Completion { session, outcome });
            });
        }
    }
}

/// Execute a single effect to completion.
pub async fn run_effect(
    factory: &dyn ClientFactory,
    handle: Option<DriveHandle>,
    effect: Effect,
) -> Outcome {
    debug!(effect = effect_name(&effect), "running effect");
    match effect {
        Effect::Connect { generation, wallet } => Outcome::Connected {
            generation,
            result: factory.connect(&wallet).await,
        },
        Effect::ReadFiles { paths } => {
            Outcome::FilesRead(read_upload_files(&paths).await.map_err(|e| e.to_string()))
        }
        Effect::FetchAccounts { generation } => Outcome::Accounts {
            generation,
            result: match &handle {
                Some(h) => h.get_storage_accounts().await,
                None => Err(ShdwError::NotConnected),
            },
        },
        Effect::FetchFiles {
            generation,
            account,
        } => Outcome::Files {
            generation,
            account,
            result: match &handle {
                Some(h) => h.get_all_files(&account).await,
                None => Err(ShdwError::NotConnected),
            },
        },
        Effect::CreateAccount {
            name,
            size,
            version,
        } => Outcome::AccountCreated(match &handle {
            Some(h) => h.create_storage_account(&name, size, version).await,
            None => Err(ShdwError::NotConnected),
        }),
        Effect::DeleteAccount { account } => Outcome::AccountDeleted {
            account,
            result: match &handle {
                Some(h) => h.delete_storage_account(&account).await,
                None => Err(ShdwError::NotConnected),
            },
        },
        Effect::Upload {
            generation,
            account,
            batch,
        } => Outcome::Uploaded {
            generation,
            result: match &handle {
                Some(h) => h.upload_batch(&account, batch).await,
                None => Err(ShdwError::NotConnected),
            },
        },
        Effect::DeleteFile { account, url } => {
            let result = match &handle {
                Some(h) => h.delete_file(&account, &url).await,
                None => Err(ShdwError::NotConnected),
            };
            Outcome::FileDeleted { url, result }
        }
    }
}

fn effect_name(effect: &Effect) -> &'static str {
    match effect {
        Effect::Connect { .. } => "connect",
        Effect::FetchAccounts { .. } => "fetch_accounts",
        Effect::FetchFiles { .. } => "fetch_files",
        Effect::CreateAccount { .. } => "create_account",
        Effect::DeleteAccount { .. } => "delete_account",
        Effect::ReadFiles { .. } => "read_files",
        Effect::Upload { .. } => "upload",
        Effect::DeleteFile { .. } => "delete_file",
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use shdw::{MockOp, MockStorageClient, Pubkey, ShadowDriveVersion, Wallet};

    use super::*;
    use crate::session::SharedClient;
    use crate::view::FileStatus;

    struct MockFactory(Arc<MockStorageClient>);

    #[async_trait]
    impl ClientFactory for MockFactory {
        async fn connect(&self, _wallet: &Wallet) -> shdw::Result<SharedClient> {
            Ok(self.0.clone())
        }
    }

    /// Drive a view to quiescence, running every effect inline.
    async fn settle(view: &mut DriveView, factory: &MockFactory, mut effects: Vec<Effect>) {
        while !effects.is_empty() {
            let mut next = Vec::new();
            for effect in effects {
                let session = view.session().generation();
                let outcome = run_effect(factory, view.session().handle(), effect).await;
                next.extend(view.apply(Completion { session, outcome }));
            }
            effects = next;
        }
    }

    fn setup(identifiers: &[&str]) -> (DriveView, MockFactory, Arc<MockStorageClient>, Wallet, Vec<Pubkey>) {
        let wallet = Wallet::generate();
        let (client, keys) = MockStorageClient::with_accounts(wallet.pubkey(), identifiers);
        let client = Arc::new(client);
        let view = DriveView::new(ShadowDriveVersion::V2, "devnet");
        (view, MockFactory(client.clone()), client, wallet, keys)
    }

    #[tokio::test]
    async fn test_connect_and_list_accounts() {
        let (mut view, factory, client, wallet, _) = setup(&["one", "two"]);
        let effects = view.connect(wallet);
        settle(&mut view, &factory, effects).await;

        assert!(view.session().is_ready());
        assert_eq!(view.accounts().len(), 2);
        assert_eq!(client.count(MockOp::ListAccounts), 1);
    }

    #[tokio::test]
    async fn test_create_account_flow_refreshes_accounts() {
        let (mut view, factory, client, wallet, _) = setup(&[]);
        let effects = view.connect(wallet);
        settle(&mut view, &factory, effects).await;

        view.form.name = "mydrive".into();
        let effects = view.create_account();
        settle(&mut view, &factory, effects).await;

        assert!(!view.is_loading());
        assert!(view.last_tx().unwrap().starts_with("tx-create-"));
        assert_eq!(view.accounts().len(), 1);
        assert_eq!(view.accounts()[0].account.identifier, "mydrive");
        assert_eq!(client.count(MockOp::CreateAccount), 1);
    }

    #[tokio::test]
    async fn test_select_upload_and_delete_file() {
        let (mut view, factory, client, wallet, keys) = setup(&["docs"]);
        let effects = view.connect(wallet);
        settle(&mut view, &factory, effects).await;

        let effects = view.select_account(keys[0]);
        settle(&mut view, &factory, effects).await;
        assert!(view.remote_files().is_empty());

        view.select_files(vec![shdw::UploadFile::new("a.json", b"{}".to_vec())]);
        let effects = view.submit_files();
        settle(&mut view, &factory, effects).await;

        let url = format!("https://shdw-drive.genesysgo.net/{}/a.json", keys[0]);
        assert_eq!(view.remote_files().to_vec(), vec![url.clone()]);

        let effects = view.delete_file(&url);
        settle(&mut view, &factory, effects).await;
        assert!(view.remote_files().is_empty());
        assert_eq!(client.count(MockOp::DeleteFile), 1);
    }

    #[tokio::test]
    async fn test_failed_upload_can_be_retried() {
        let (mut view, factory, client, wallet, keys) = setup(&["docs"]);
        let effects = view.connect(wallet);
        settle(&mut view, &factory, effects).await;
        let effects = view.select_account(keys[0]);
        settle(&mut view, &factory, effects).await;

        view.select_files(vec![shdw::UploadFile::new("a.json", b"{}".to_vec())]);
        client.fail(MockOp::Upload);
        let effects = view.submit_files();
        settle(&mut view, &factory, effects).await;
        assert_eq!(view.file_rows()[0].status, FileStatus::Pending);
        assert!(view.remote_files().is_empty());

        client.recover(MockOp::Upload);
        let effects = view.submit_files();
        settle(&mut view, &factory, effects).await;

        let url = format!("https://shdw-drive.genesysgo.net/{}/a.json", keys[0]);
        assert_eq!(view.file_rows()[0].status, FileStatus::Uploaded(url.clone()));
        assert_eq!(view.remote_files().to_vec(), vec![url]);
        assert_eq!(client.count(MockOp::Upload), 2);
    }

    #[tokio::test]
    async fn test_delete_selected_account_flow() {
        let (mut view, factory, _client, wallet, keys) = setup(&["one", "two"]);
        let effects = view.connect(wallet);
        settle(&mut view, &factory, effects).await;

        let effects = view.select_account(keys[0]);
        settle(&mut view, &factory, effects).await;
        let effects = view.delete_account();
        settle(&mut view, &factory, effects).await;

        assert!(view.selected().is_none());
        assert_eq!(view.accounts().len(), 1);
        assert_eq!(view.accounts()[0].public_key, keys[1]);
    }

    #[tokio::test]
    async fn test_fetch_failure_surfaces_notice() {
        let (mut view, factory, client, wallet, _) = setup(&["one"]);
        client.fail(MockOp::ListAccounts);
        let effects = view.connect(wallet);
        settle(&mut view, &factory, effects).await;

        assert!(view.accounts().is_empty());
        let notice = view.notices().back().unwrap();
        assert_eq!(notice.level, crate::view::NoticeLevel::Error);
        assert!(notice.message.contains("storage accounts"));
    }

    #[tokio::test]
    async fn test_effect_without_client_reports_not_connected() {
        let (_view, factory, _client, _wallet, _) = setup(&[]);
        let outcome = run_effect(&factory, None, Effect::FetchAccounts { generation: 1 }).await;
        assert!(matches!(
            outcome,
            Outcome::Accounts {
                result: Err(ShdwError::NotConnected),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_executor_delivers_completions() {
        let (mut view, factory, _client, wallet, _) = setup(&["one"]);
        let (executor, mut rx) = Executor::new(Arc::new(factory));

        let effects = view.connect(wallet);
        executor.dispatch(&view, effects);
        let completion = rx.recv().await.unwrap();
        let effects = view.apply(completion);
        assert!(view.session().is_ready());

        executor.dispatch(&view, effects);
        let completion = rx.recv().await.unwrap();
        view.apply(completion);
        assert_eq!(view.accounts().len(), 1);
    }
}
