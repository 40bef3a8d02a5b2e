// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]

mod common;

use common::{journal, other_root, root, FakeTransport, FakeWallet, JournalStore};
use seeker_app_core::config::MemConfigStore;
use seeker_config_fs::FsConfigStore;
use seeker_session_proto::{signin_message, SESSION_SCOPE, SESSION_TTL};
use seeker_sync::{ClientError, IdentityManager, KeyScheme, LocalKeyScheme, LocalSessionKey, SessionKey, WalletError};

#[tokio::test]
async fn establish_without_stored_key_signs_in_once_and_persists_that_key() {
    let manager = IdentityManager::new(MemConfigStore::new(), LocalKeyScheme);
    let wallet = FakeWallet::new(root());
    let transport = FakeTransport::default();

    let identity = manager.establish(&wallet, &transport, "latest").await.unwrap();

    let signins = transport.signins.lock().unwrap().clone();
    assert_eq!(signins.len(), 1);
    let signin = &signins[0];
    assert_eq!(signin.game_id, "latest");
    assert_eq!(signin.session, identity.session_address());
    assert_eq!(signin.ttl, SESSION_TTL);
    assert_eq!(signin.scope, SESSION_SCOPE);

    let message = signin_message(&signin.session);
    assert_eq!(wallet.signed.lock().unwrap().as_slice(), &[message.clone()]);
    assert_eq!(signin.authorization, FakeWallet::signature_for(&message).to_hex());

    let stored = manager.store().session_secret().unwrap().unwrap();
    let restored = LocalKeyScheme.import(&stored).unwrap();
    assert_eq!(restored.address(), signin.session);
    assert_eq!(identity.root_address(), &root());
    assert_eq!(manager.store().root_address().unwrap(), Some(root()));
}

#[tokio::test]
async fn stored_key_for_the_same_root_is_reused_without_signin() {
    let manager = IdentityManager::new(MemConfigStore::new(), LocalKeyScheme);
    let wallet = FakeWallet::new(root());
    let transport = FakeTransport::default();

    let first = manager.establish(&wallet, &transport, "latest").await.unwrap();
    let second = manager.establish(&wallet, &transport, "latest").await.unwrap();

    assert_eq!(first.session_address(), second.session_address());
    assert_eq!(transport.signins.lock().unwrap().len(), 1);
    assert_eq!(wallet.signed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn root_change_clears_storage_before_any_signin() {
    let log = journal();
    let store = JournalStore::new(log.clone());
    let old_key = LocalSessionKey::from_secret([9; 32]);
    {
        let seeded = IdentityManager::new(&store, LocalKeyScheme);
        seeded.store().bind_root(&other_root()).unwrap();
        seeded.store().save_session(&old_key.export()).unwrap();
    }
    log.lock().unwrap().clear();

    let manager = IdentityManager::new(&store, LocalKeyScheme);
    let transport = FakeTransport {
        journal: Some(log.clone()),
        ..FakeTransport::default()
    };
    let identity = manager
        .establish(&FakeWallet::new(root()), &transport, "latest")
        .await
        .unwrap();

    assert_ne!(identity.session_address(), old_key.address());
    assert_eq!(
        log.lock().unwrap().as_slice(),
        &["clear", "save root_address", "signin", "save session_key"]
    );
    assert_eq!(manager.store().root_address().unwrap(), Some(root()));
}

#[tokio::test]
async fn refused_signin_persists_no_session_key() {
    let manager = IdentityManager::new(MemConfigStore::new(), LocalKeyScheme);
    let transport = FakeTransport {
        refuse_signin: true,
        ..FakeTransport::default()
    };

    let err = manager
        .establish(&FakeWallet::new(root()), &transport, "latest")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::SigninRejected));
    assert_eq!(manager.store().session_secret().unwrap(), None);
}

#[tokio::test]
async fn wallet_failures_map_to_fatal_startup_errors() {
    let manager = IdentityManager::new(MemConfigStore::new(), LocalKeyScheme);
    let transport = FakeTransport::default();

    let missing = FakeWallet::failing(WalletError::Unavailable("no provider".into()));
    let err = manager.establish(&missing, &transport, "latest").await.unwrap_err();
    assert!(matches!(err, ClientError::WalletUnavailable(_)));

    let mut declining = FakeWallet::new(root());
    declining.refuse_signing = true;
    let err = manager.establish(&declining, &transport, "latest").await.unwrap_err();
    assert!(matches!(err, ClientError::UserRejected));
    assert!(err.is_fatal());
    assert!(transport.signins.lock().unwrap().is_empty());
}

#[tokio::test]
async fn undecodable_stored_key_triggers_fresh_signin() {
    let manager = IdentityManager::new(MemConfigStore::new(), LocalKeyScheme);
    manager.store().bind_root(&root()).unwrap();
    manager.store().save_session("0xnot-a-key").unwrap();
    let transport = FakeTransport::default();

    let identity = manager
        .establish(&FakeWallet::new(root()), &transport, "latest")
        .await
        .unwrap();

    assert_eq!(transport.signins.lock().unwrap().len(), 1);
    let stored = manager.store().session_secret().unwrap().unwrap();
    assert_eq!(
        LocalKeyScheme.import(&stored).unwrap().address(),
        identity.session_address()
    );
}

#[tokio::test]
async fn sign_out_forgets_everything() {
    let manager = IdentityManager::new(MemConfigStore::new(), LocalKeyScheme);
    let transport = FakeTransport::default();
    manager
        .establish(&FakeWallet::new(root()), &transport, "latest")
        .await
        .unwrap();

    manager.sign_out().unwrap();

    assert_eq!(manager.store().root_address().unwrap(), None);
    assert_eq!(manager.store().session_secret().unwrap(), None);
}

#[tokio::test]
async fn session_survives_a_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let wallet = FakeWallet::new(root());
    let transport = FakeTransport::default();

    let first = {
        let store = FsConfigStore::at(dir.path()).unwrap();
        IdentityManager::new(store, LocalKeyScheme)
            .establish(&wallet, &transport, "latest")
            .await
            .unwrap()
    };
    let second = {
        let store = FsConfigStore::at(dir.path()).unwrap();
        IdentityManager::new(store, LocalKeyScheme)
            .establish(&wallet, &transport, "latest")
            .await
            .unwrap()
    };

    assert_eq!(first.session_address(), second.session_address());
    assert_eq!(transport.signins.lock().unwrap().len(), 1);
}
