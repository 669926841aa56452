use ark_std::rand::{rngs::StdRng, SeedableRng};
use groupsig::{
    registry, BlindingKey, Crl, GroupKey, GroupSigError, Gml, JoinMessage, ManagerKey, MemberKey,
    Message, SchemeCode, SchemeContext, Signature,
};
use groupsig_utils::text;
use test_utils::{add_member, init_logger, messages, setup_group, sign_all, test_export};

const ALL: [SchemeCode; 4] = [
    SchemeCode::GL19,
    SchemeCode::PS16,
    SchemeCode::DL21,
    SchemeCode::DL21SEQ,
];

#[test]
fn join_parameters_are_fixed_per_scheme() {
    for code in ALL {
        let ctx = SchemeContext::init(code, 0).unwrap();
        assert_eq!(ctx.join_start(), 0);
        assert_eq!(ctx.join_seq(), 3);
        assert_eq!(registry::description(code).unwrap(), ctx.description());
    }
    assert!(matches!(
        SchemeContext::init(SchemeCode(5), 0),
        Err(GroupSigError::UnknownScheme(5))
    ));
}

#[test]
fn sign_and_verify() {
    init_logger();
    for code in ALL {
        let ctx = SchemeContext::init(code, 1).unwrap();
        let mut rng = ctx.rng();
        let mut group = setup_group(&ctx, &mut rng).unwrap();
        let memkey = add_member(&ctx, &mut rng, &mut group).unwrap();
        assert!(memkey.is_usable());
        assert_eq!(group.gml.len(), 1);

        let msg = Message::from("hello");
        let sig = ctx.sign(&mut rng, &msg, &memkey, &group.grpkey, 0).unwrap();
        assert!(ctx.verify(&sig, &msg, &group.grpkey).unwrap(), "{}", code);

        // A single changed byte invalidates the signature
        let mut altered = msg.clone().into_bytes();
        altered[0] ^= 1;
        assert!(!ctx
            .verify(&sig, &Message::from(altered), &group.grpkey)
            .unwrap());
        assert!(!ctx
            .verify(&sig, &Message::from("hello!"), &group.grpkey)
            .unwrap());

        // Another group's key does not verify it
        let other = setup_group(&ctx, &mut rng).unwrap();
        assert!(!ctx.verify(&sig, &msg, &other.grpkey).unwrap());

        // Empty messages are signed like any other
        let empty = Message::default();
        let sig = ctx.sign(&mut rng, &empty, &memkey, &group.grpkey, 1).unwrap();
        assert!(ctx.verify(&sig, &empty, &group.grpkey).unwrap());
        ctx.clear();
    }
}

#[test]
fn batch_verification() {
    for code in ALL {
        let ctx = SchemeContext::init(code, 2).unwrap();
        let mut rng = ctx.rng();
        let mut group = setup_group(&ctx, &mut rng).unwrap();
        let m1 = add_member(&ctx, &mut rng, &mut group).unwrap();
        let m2 = add_member(&ctx, &mut rng, &mut group).unwrap();
        assert_eq!(group.gml.len(), 2);

        let msgs = messages(4);
        let mut sigs = sign_all(&ctx, &mut rng, &m1, &group.grpkey, &msgs[..2]).unwrap();
        sigs.extend(sign_all(&ctx, &mut rng, &m2, &group.grpkey, &msgs[2..]).unwrap());
        assert!(ctx.verify_batch(&sigs, &msgs, &group.grpkey).unwrap());
        assert!(ctx.verify_batch(&[], &[], &group.grpkey).unwrap());

        let mut swapped = msgs.clone();
        swapped.swap(0, 3);
        assert!(!ctx.verify_batch(&sigs, &swapped, &group.grpkey).unwrap());

        assert!(matches!(
            ctx.verify_batch(&sigs, &msgs[..3], &group.grpkey),
            Err(GroupSigError::ExpectedSameSizeSequences(4, 3))
        ));
    }
}

/// Copy of `sig` with one byte of its material flipped
fn corrupted(sig: &Signature, code: SchemeCode) -> Signature {
    let mut bytes = text::from_base64(&sig.export().unwrap()).unwrap();
    bytes[14] ^= 0xff;
    Signature::import(code, &text::to_base64(&bytes)).unwrap()
}

#[test]
fn malformed_signatures_do_not_verify() {
    for code in ALL {
        let ctx = SchemeContext::init(code, 3).unwrap();
        let mut rng = ctx.rng();
        let mut group = setup_group(&ctx, &mut rng).unwrap();
        let memkey = add_member(&ctx, &mut rng, &mut group).unwrap();

        let msgs = messages(2);
        let sigs = sign_all(&ctx, &mut rng, &memkey, &group.grpkey, &msgs).unwrap();
        let bad = corrupted(&sigs[1], code);
        assert_ne!(bad, sigs[1]);
        assert!(!ctx.verify(&bad, &msgs[1], &group.grpkey).unwrap(), "{}", code);

        let batch = [sigs[0].clone(), bad];
        assert!(!ctx.verify_batch(&batch, &msgs, &group.grpkey).unwrap());
    }

    // Linking treats undecodable signatures as not linked
    for code in [SchemeCode::DL21, SchemeCode::DL21SEQ] {
        let ctx = SchemeContext::init(code, 3).unwrap();
        let mut rng = ctx.rng();
        let mut group = setup_group(&ctx, &mut rng).unwrap();
        let memkey = add_member(&ctx, &mut rng, &mut group).unwrap();

        let msgs = messages(2);
        let sigs = sign_all(&ctx, &mut rng, &memkey, &group.grpkey, &msgs).unwrap();
        let msg = Message::from("linked");
        let proof = ctx
            .link(&mut rng, &group.grpkey, &memkey, &msg, &sigs, &msgs)
            .unwrap()
            .unwrap();
        let batch = [sigs[0].clone(), corrupted(&sigs[1], code)];
        assert!(!ctx
            .verify_link(&group.grpkey, &proof, &msg, &batch, &msgs)
            .unwrap());
        assert!(ctx
            .link(&mut rng, &group.grpkey, &memkey, &msg, &batch, &msgs)
            .unwrap()
            .is_none());
    }
}

#[test]
fn export_and_import() {
    for code in ALL {
        let ctx = SchemeContext::init(code, 3).unwrap();
        let mut rng = ctx.rng();
        let mut group = setup_group(&ctx, &mut rng).unwrap();
        let memkey = add_member(&ctx, &mut rng, &mut group).unwrap();
        let msg = Message::from("exported");
        let sig = ctx.sign(&mut rng, &msg, &memkey, &group.grpkey, 0).unwrap();

        test_export!(GroupKey, group.grpkey);
        test_export!(ManagerKey, group.mgrkey);
        test_export!(MemberKey, memkey);
        test_export!(Signature, sig);
        test_export!(groupsig::SchemeParams, ctx.params().clone());

        // Imported objects work like the originals
        let grpkey = GroupKey::import(code, &group.grpkey.export().unwrap()).unwrap();
        let memkey = MemberKey::import(code, &memkey.export().unwrap()).unwrap();
        assert!(memkey.is_usable());
        let sig = ctx.sign(&mut rng, &msg, &memkey, &grpkey, 1).unwrap();
        let sig = Signature::import(code, &sig.export().unwrap()).unwrap();
        assert!(ctx.verify(&sig, &msg, &grpkey).unwrap());

        let gml = Gml::import(code, &group.gml.export().unwrap()).unwrap();
        assert_eq!(gml, group.gml);
        let crl = Crl::new(code);
        assert_eq!(Crl::import(code, &crl.export().unwrap()).unwrap(), crl);

        // Secrets are not printed
        let printed = group.mgrkey.to_string();
        assert!(printed.is_ascii());
        assert!(!printed.contains(&group.mgrkey.export().unwrap()));
        assert!(sig.to_string().contains(&sig.export().unwrap()));

        assert!(Signature::import(code, "not base64!").is_err());
        assert!(Signature::import(code, "").is_err());
        assert!(matches!(
            Signature::import(SchemeCode(9), &sig.export().unwrap()),
            Err(GroupSigError::ImportSchemeMismatch { .. })
        ));
    }

    let ctx = SchemeContext::init(SchemeCode::GL19, 3).unwrap();
    let mut rng = ctx.rng();
    let group = setup_group(&ctx, &mut rng).unwrap();
    let bldkey = ctx.blinding_keygen(&mut rng, &group.grpkey).unwrap();
    let full = BlindingKey::import(ctx.code(), &bldkey.export().unwrap()).unwrap();
    assert_eq!(full, bldkey);
    let public = BlindingKey::import(ctx.code(), &bldkey.export_public().unwrap()).unwrap();
    assert!(!public.has_secret());
    assert_eq!(public, bldkey.public_key());
}

#[test]
fn out_of_sequence_join() {
    init_logger();
    for code in ALL {
        let ctx = SchemeContext::init(code, 4).unwrap();
        let mut rng = ctx.rng();
        let mut group = setup_group(&ctx, &mut rng).unwrap();
        let mgr = |rng: &mut StdRng, seq, msg: Option<&JoinMessage>, gml: &mut Gml| {
            ctx.join_mgr(rng, seq, msg, &group.mgrkey, &group.grpkey, gml)
        };
        let mut gml = group.gml.clone();

        let m0 = mgr(&mut rng, 0, None, &mut gml).unwrap();
        assert_eq!(m0.seq(), 0);

        // Wrong party, missing or unexpected input and steps past the end
        for (seq, msg) in [(1u8, Some(&m0)), (2, None), (0, Some(&m0)), (4, Some(&m0))] {
            assert!(matches!(
                mgr(&mut rng, seq, msg, &mut gml),
                Err(GroupSigError::ProtocolSequence { .. })
            ));
        }
        assert!(matches!(
            ctx.join_mem(&mut rng, 0, None, None, &group.grpkey),
            Err(GroupSigError::ProtocolSequence { seq: 0, .. })
        ));
        assert!(matches!(
            ctx.join_mem(&mut rng, 3, Some(&m0), None, &group.grpkey),
            Err(GroupSigError::ProtocolSequence { seq: 3, .. })
        ));

        let s1 = ctx
            .join_mem(&mut rng, 1, Some(&m0), None, &group.grpkey)
            .unwrap();
        assert!(!s1.memkey.is_usable());
        assert_eq!(s1.memkey.join_step(), 1);
        let m1 = s1.msg_out.clone().unwrap();

        // Step 2 fed the challenge instead of the request
        assert!(matches!(
            mgr(&mut rng, 2, Some(&m0), &mut gml),
            Err(GroupSigError::ProtocolSequence { seq: 2, .. })
        ));
        assert!(gml.is_empty());

        // A partial member key cannot sign
        assert!(matches!(
            ctx.sign(&mut rng, &Message::from("x"), &s1.memkey, &group.grpkey, 0),
            Err(GroupSigError::IncompleteMemberKey)
        ));

        let m2 = mgr(&mut rng, 2, Some(&m1), &mut gml).unwrap();
        assert_eq!(gml.len(), 1);

        // Replaying the request does not enroll the member twice
        assert!(matches!(
            mgr(&mut rng, 2, Some(&m1), &mut gml),
            Err(GroupSigError::ProtocolSequence { seq: 2, .. })
        ));
        assert_eq!(gml.len(), 1);

        // A request answering another manager's challenge is rejected
        let other = setup_group(&ctx, &mut rng).unwrap();
        let mut other_gml = other.gml.clone();
        assert!(ctx
            .join_mgr(&mut rng, 2, Some(&m1), &other.mgrkey, &other.grpkey, &mut other_gml)
            .is_err());
        assert!(other_gml.is_empty());

        // Final step without the partial key, or with the wrong message
        assert!(matches!(
            ctx.join_mem(&mut rng, 3, Some(&m2), None, &group.grpkey),
            Err(GroupSigError::ProtocolSequence { seq: 3, .. })
        ));
        assert!(matches!(
            ctx.join_mem(&mut rng, 3, Some(&m1), Some(&s1.memkey), &group.grpkey),
            Err(GroupSigError::ProtocolSequence { seq: 3, .. })
        ));
        let before = s1.memkey.clone();
        let s3 = ctx
            .join_mem(&mut rng, 3, Some(&m2), Some(&s1.memkey), &group.grpkey)
            .unwrap();
        assert_eq!(s1.memkey, before);
        assert!(s3.msg_out.is_none());
        assert!(s3.memkey.is_usable());

        // A completed key cannot run the protocol again
        assert!(matches!(
            ctx.join_mem(&mut rng, 3, Some(&m2), Some(&s3.memkey), &group.grpkey),
            Err(GroupSigError::ProtocolSequence { seq: 3, .. })
        ));

        group.gml = gml;
        let msg = Message::from("joined");
        let sig = ctx.sign(&mut rng, &msg, &s3.memkey, &group.grpkey, 0).unwrap();
        assert!(ctx.verify(&sig, &msg, &group.grpkey).unwrap());
    }
}

#[test]
fn objects_of_other_schemes() {
    let ps16 = SchemeContext::init(SchemeCode::PS16, 5).unwrap();
    let dl21 = SchemeContext::init(SchemeCode::DL21, 5).unwrap();
    let mut rng = ps16.rng();
    let mut group = setup_group(&dl21, &mut rng).unwrap();
    let memkey = add_member(&dl21, &mut rng, &mut group).unwrap();
    let msg = Message::from("hello");
    let sig = dl21.sign(&mut rng, &msg, &memkey, &group.grpkey, 0).unwrap();

    assert!(matches!(
        ps16.verify(&sig, &msg, &group.grpkey),
        Err(GroupSigError::SchemeMismatch {
            expected: SchemeCode::PS16,
            found: SchemeCode::DL21
        })
    ));
    assert!(matches!(
        ps16.sign(&mut rng, &msg, &memkey, &group.grpkey, 0),
        Err(GroupSigError::SchemeMismatch { .. })
    ));
}

#[test]
fn unsupported_operations() {
    let msg = Message::from("hello");
    for code in [SchemeCode::DL21, SchemeCode::GL19] {
        let ctx = SchemeContext::init(code, 6).unwrap();
        let mut rng = ctx.rng();
        let mut group = setup_group(&ctx, &mut rng).unwrap();
        let memkey = add_member(&ctx, &mut rng, &mut group).unwrap();
        let sig = ctx.sign(&mut rng, &msg, &memkey, &group.grpkey, 0).unwrap();
        let mut crl = Crl::new(code);

        assert!(matches!(
            ctx.reveal(&mut crl, &group.gml, 0),
            Err(GroupSigError::UnsupportedOperation { operation: "reveal", .. })
        ));
        assert!(matches!(
            ctx.claim(&mut rng, &memkey, &group.grpkey, &sig),
            Err(GroupSigError::UnsupportedOperation { .. })
        ));
        assert!(crl.is_empty());
    }

    let ctx = SchemeContext::init(SchemeCode::DL21, 6).unwrap();
    let mut rng = ctx.rng();
    let mut group = setup_group(&ctx, &mut rng).unwrap();
    let memkey = add_member(&ctx, &mut rng, &mut group).unwrap();
    let sig = ctx.sign(&mut rng, &msg, &memkey, &group.grpkey, 0).unwrap();
    assert!(matches!(
        ctx.seqlink(&mut rng, &group.grpkey, &memkey, &msg, &[sig.clone()], &[msg.clone()]),
        Err(GroupSigError::UnsupportedOperation { operation: "seqlink", .. })
    ));
    assert!(matches!(
        ctx.blinding_keygen(&mut rng, &group.grpkey),
        Err(GroupSigError::UnsupportedOperation { .. })
    ));
    // Issuers of DL21 cannot open
    assert!(matches!(
        ctx.open(&mut rng, &sig, &group.grpkey, &group.mgrkey, &group.gml),
        Err(GroupSigError::WrongKeyRole { operation: "open", .. })
    ));

    let ps16 = SchemeContext::init(SchemeCode::PS16, 6).unwrap();
    let group = setup_group(&ps16, &mut rng).unwrap();
    assert!(matches!(
        ps16.setup(&mut rng, Some(&group.grpkey)),
        Err(GroupSigError::SetupAlreadyComplete)
    ));
}
