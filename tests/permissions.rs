use stockctl::models::{Group, UserProfile};
use stockctl::permissions::{has_capability, Capability, READER_GROUP};

fn profile_in(groups: &[&str]) -> UserProfile {
    UserProfile {
        groups: groups
            .iter()
            .enumerate()
            .map(|(i, name)| Group {
                id: i as u64 + 1,
                name: name.to_string(),
            })
            .collect(),
        estoques: vec![3],
        ..Default::default()
    }
}

#[test]
fn test_no_profile_grants_nothing() {
    assert!(!has_capability(None, Capability::ViewInventory));
    assert!(!has_capability(None, Capability::AccessStock(3)));
}

#[test]
fn test_superuser_grants_everything() {
    let profile = UserProfile {
        is_superuser: true,
        ..Default::default()
    };

    for capability in [
        Capability::ViewInventory,
        Capability::ManageEquipment,
        Capability::DeleteEquipment,
        Capability::ManageUsers,
        Capability::ManageStocks,
        Capability::AccessStock(99),
    ] {
        assert!(has_capability(Some(&profile), capability), "{}", capability);
    }
}

#[test]
fn test_admin_group() {
    let admin = profile_in(&["Administrador"]);

    assert!(has_capability(Some(&admin), Capability::ManageEquipment));
    assert!(has_capability(Some(&admin), Capability::DeleteEquipment));
    assert!(has_capability(Some(&admin), Capability::ManageUsers));
    assert!(has_capability(Some(&admin), Capability::ManageStocks));
    // Stock access still follows the assigned stocks
    assert!(has_capability(Some(&admin), Capability::AccessStock(3)));
    assert!(!has_capability(Some(&admin), Capability::AccessStock(4)));
}

#[test]
fn test_standard_group_can_edit_but_not_delete() {
    let standard = profile_in(&["Padrão"]);

    assert!(has_capability(Some(&standard), Capability::ViewInventory));
    assert!(has_capability(Some(&standard), Capability::ManageEquipment));
    assert!(!has_capability(Some(&standard), Capability::DeleteEquipment));
    assert!(!has_capability(Some(&standard), Capability::ManageUsers));
}

#[test]
fn test_reader_group_is_read_only() {
    let reader = profile_in(&[READER_GROUP]);

    assert!(has_capability(Some(&reader), Capability::ViewInventory));
    assert!(!has_capability(Some(&reader), Capability::ManageEquipment));
    assert!(!has_capability(Some(&reader), Capability::DeleteEquipment));
}

#[test]
fn test_capability_parsing() {
    assert_eq!(
        "manage-equipment".parse::<Capability>().unwrap(),
        Capability::ManageEquipment
    );
    assert_eq!(
        "access-stock:12".parse::<Capability>().unwrap(),
        Capability::AccessStock(12)
    );
    assert!("access-stock:abc".parse::<Capability>().is_err());
    assert!("fly".parse::<Capability>().is_err());
    assert_eq!(Capability::AccessStock(12).to_string(), "access-stock:12");
}
