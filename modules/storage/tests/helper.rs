// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use std::path::PathBuf;
use storage::FilesSystemStorage;

pub fn get_path(folder_name: &str) -> String {
    std::env::temp_dir()
        .join("paseo_storage_tests")
        .join(folder_name)
        .to_string_lossy()
        .to_string()
}

pub fn setup_empty_test_folder(folder_name: &str) {
    let path = get_path(folder_name);
    if let Ok(true) = std::fs::exists(&path) {
        std::fs::remove_dir_all(&path)
            .unwrap_or_else(|e| panic!("Failed to clear the test folder {path}. Reason: {e}"));
    }
    std::fs::create_dir_all(&path)
        .unwrap_or_else(|e| panic!("Failed to create the test folder {path}. Reason: {e}"));
}

pub fn create_storage(folder_name: &str) -> FilesSystemStorage {
    setup_empty_test_folder(folder_name);
    FilesSystemStorage::new(&PathBuf::from(get_path(folder_name)))
}
