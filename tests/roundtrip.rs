use duocrypt::*;

#[test]
fn zero_key_hello_world_roundtrip() {
    let key = SymmetricKey::from_base64("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=").unwrap();
    assert_eq!(key.as_bytes(), &[0u8; 32]);

    let t1 = symmetric::encrypt("Hello, World!", &key).unwrap();
    let t2 = symmetric::encrypt("Hello, World!", &key).unwrap();

    // Fresh nonce per call
    assert_ne!(t1, t2);
    assert_eq!(symmetric::decrypt(&t1, &key).unwrap(), "Hello, World!");
    assert_eq!(symmetric::decrypt(&t2, &key).unwrap(), "Hello, World!");
}

#[test]
fn sender_receiver_roundtrip_and_third_party_rejection() {
    let a = KeyPair::generate().unwrap(); // sender
    let b = KeyPair::generate().unwrap(); // receiver
    let c = KeyPair::generate().unwrap(); // unrelated

    let token = asymmetric::encrypt("Hi", &b.public, &a.private).unwrap();
    assert_eq!(asymmetric::decrypt(&token, &b.private, &a.public).unwrap(), "Hi");

    let err = asymmetric::decrypt(&token, &c.private, &a.public).unwrap_err();
    assert!(matches!(err, HybridError::DecryptionFailed(_)));
}

#[test]
fn text_level_roundtrips() {
    let key = generate_symmetric_key();
    let token = encrypt_symmetric("Hello, World!", &key).unwrap();
    assert_ne!(token, "Hello, World!");
    assert_eq!(decrypt_symmetric(&token, &key).unwrap(), "Hello, World!");

    let (sender_private, sender_public) = generate_asymmetric_keypair().unwrap();
    let (receiver_private, receiver_public) = generate_asymmetric_keypair().unwrap();
    let token = encrypt_asymmetric("Hello, World!", &receiver_public, &sender_private).unwrap();
    let message = decrypt_asymmetric(&token, &receiver_private, &sender_public).unwrap();
    assert_eq!(message, "Hello, World!");
}
