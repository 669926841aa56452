use std::collections::HashSet;

use ark_std::rand::rngs::StdRng;
use groupsig::{
    BlindSignature, BlindingKey, GroupSigError, Identity, ManagerRole, Message, SchemeCode,
    SchemeContext,
};
use test_utils::{add_member, init_logger, messages, setup_group, sign_all, test_export, Group};

fn converter(group: &Group) -> &groupsig::ManagerKey {
    group.converter.as_ref().unwrap()
}

#[test]
fn two_phase_setup() {
    let ctx = SchemeContext::init(SchemeCode::GL19, 31).unwrap();
    let mut rng = ctx.rng();
    let (partial, issuer) = ctx.setup(&mut rng, None).unwrap();
    assert_eq!(issuer.role(), ManagerRole::Issuer);

    // Members can join before the converter exists but cannot sign
    let mut group = Group {
        grpkey: partial.clone(),
        mgrkey: issuer.clone(),
        converter: None,
        gml: groupsig::Gml::new(ctx.code()),
    };
    let memkey = add_member(&ctx, &mut rng, &mut group).unwrap();
    assert!(matches!(
        ctx.sign(&mut rng, &Message::from("early"), &memkey, &partial, 0),
        Err(GroupSigError::IncompleteGroupKey)
    ));

    let (grpkey, cnvkey) = ctx.setup(&mut rng, Some(&partial)).unwrap();
    assert_eq!(cnvkey.role(), ManagerRole::Converter);
    assert_ne!(grpkey, partial);
    assert!(matches!(
        ctx.setup(&mut rng, Some(&grpkey)),
        Err(GroupSigError::SetupAlreadyComplete)
    ));

    // The completed key keeps the issuer's part so earlier members can sign with it
    let msg = Message::from("late");
    let sig = ctx.sign(&mut rng, &msg, &memkey, &grpkey, 0).unwrap();
    assert!(ctx.verify(&sig, &msg, &grpkey).unwrap());

    // Only the issuer runs the join protocol and only the converter converts
    let mut gml = groupsig::Gml::new(ctx.code());
    assert!(matches!(
        ctx.join_mgr(&mut rng, 0, None, &cnvkey, &grpkey, &mut gml),
        Err(GroupSigError::WrongKeyRole { role: ManagerRole::Converter, .. })
    ));
    let bldkey = ctx.blinding_keygen(&mut rng, &grpkey).unwrap();
    let bsig = ctx.blind(&mut rng, &grpkey, &sig, &msg, &bldkey).unwrap();
    assert!(matches!(
        ctx.convert(&mut rng, &[bsig], &grpkey, &issuer, &bldkey, None),
        Err(GroupSigError::WrongKeyRole { role: ManagerRole::Issuer, .. })
    ));
}

#[test]
fn blind_convert_unblind() {
    init_logger();
    let ctx = SchemeContext::init(SchemeCode::GL19, 32).unwrap();
    let mut rng = ctx.rng();
    let mut group = setup_group(&ctx, &mut rng).unwrap();
    let m0 = add_member(&ctx, &mut rng, &mut group).unwrap();
    let m1 = add_member(&ctx, &mut rng, &mut group).unwrap();
    let bldkey = ctx.blinding_keygen(&mut rng, &group.grpkey).unwrap();
    assert!(bldkey.has_secret());
    let public = bldkey.public_key();

    let msgs = messages(4);
    let mut sigs = sign_all(&ctx, &mut rng, &m0, &group.grpkey, &msgs[..2]).unwrap();
    sigs.extend(sign_all(&ctx, &mut rng, &m1, &group.grpkey, &msgs[2..]).unwrap());

    let bsigs = sigs
        .iter()
        .zip(&msgs)
        .map(|(sig, msg)| {
            ctx.blind(&mut rng, &group.grpkey, sig, msg, &public)
                .unwrap()
        })
        .collect::<Vec<_>>();
    assert!(bsigs.iter().all(|b| !b.is_converted()));
    test_export!(BlindSignature, bsigs[0]);

    let unblind_all = |csigs: &[BlindSignature]| {
        csigs
            .iter()
            .map(|c| ctx.unblind(c, &bldkey).unwrap())
            .collect::<Vec<Identity>>()
    };

    // Converting the signatures of each member on their own shows which are linked
    let convert = |rng: &mut StdRng, batch: &[BlindSignature]| {
        ctx.convert(rng, batch, &group.grpkey, converter(&group), &public, None)
            .unwrap()
    };
    let first = unblind_all(&convert(&mut rng, &bsigs[..2]));
    assert_eq!(first[0], first[1]);
    let second = unblind_all(&convert(&mut rng, &bsigs[2..]));
    assert_eq!(second[0], second[1]);
    // Separate batches give unrelated identities, even for the same member
    assert_ne!(first[0], second[0]);
    let again = unblind_all(&convert(&mut rng, &bsigs[..2]));
    assert_ne!(first[0], again[0]);

    // In one batch the same member gives the same identity and different members differ
    let csigs = convert(&mut rng, &bsigs);
    assert_eq!(csigs.len(), 4);
    assert!(csigs.iter().all(|c| c.is_converted()));
    let identities = unblind_all(&csigs);
    let distinct = identities.iter().cloned().collect::<HashSet<_>>();
    assert_eq!(distinct.len(), 2);
    for id in &distinct {
        assert_eq!(identities.iter().filter(|i| *i == id).count(), 2);
    }
    test_export!(Identity, identities[0]);

    // Stages and the secret half of the blinding key are checked
    assert!(matches!(
        ctx.convert(&mut rng, &csigs, &group.grpkey, converter(&group), &public, None),
        Err(GroupSigError::BlindSignatureStage { expected: "blinded", .. })
    ));
    assert!(matches!(
        ctx.unblind(&bsigs[0], &bldkey),
        Err(GroupSigError::BlindSignatureStage { expected: "converted", .. })
    ));
    assert!(matches!(
        ctx.unblind(&csigs[0], &public),
        Err(GroupSigError::MissingBlindingSecret)
    ));

    // Another blinding key cannot unblind
    let other = ctx.blinding_keygen(&mut rng, &group.grpkey).unwrap();
    let wrong = csigs
        .iter()
        .map(|c| ctx.unblind(c, &other).unwrap())
        .collect::<HashSet<_>>();
    assert_eq!(wrong.len(), 4);
}

#[test]
fn blind_rejects_invalid_signatures() {
    let ctx = SchemeContext::init(SchemeCode::GL19, 33).unwrap();
    let mut rng = ctx.rng();
    let mut group = setup_group(&ctx, &mut rng).unwrap();
    let memkey = add_member(&ctx, &mut rng, &mut group).unwrap();
    let bldkey = ctx.blinding_keygen(&mut rng, &group.grpkey).unwrap();

    let msg = Message::from("hello");
    let sig = ctx.sign(&mut rng, &msg, &memkey, &group.grpkey, 0).unwrap();
    assert!(matches!(
        ctx.blind(&mut rng, &group.grpkey, &sig, &Message::from("hullo"), &bldkey),
        Err(GroupSigError::InvalidSignature)
    ));
    assert!(ctx.convert(&mut rng, &[], &group.grpkey, converter(&group), &bldkey, None)
        .unwrap()
        .is_empty());
}

#[test]
fn blinding_key_export() {
    let ctx = SchemeContext::init(SchemeCode::GL19, 34).unwrap();
    let mut rng = ctx.rng();
    let group = setup_group(&ctx, &mut rng).unwrap();
    let bldkey = ctx.blinding_keygen(&mut rng, &group.grpkey).unwrap();

    let full = BlindingKey::import(ctx.code(), &bldkey.export().unwrap()).unwrap();
    assert_eq!(full, bldkey);
    assert!(full.has_secret());
    let public = BlindingKey::import(ctx.code(), &bldkey.export_public().unwrap()).unwrap();
    assert!(!public.has_secret());
    assert_eq!(public.export().unwrap(), bldkey.export_public().unwrap());
    assert!(matches!(
        BlindingKey::import(SchemeCode::PS16, &bldkey.export().unwrap()),
        Err(GroupSigError::ImportSchemeMismatch { .. })
    ));

    // Secret part is not printed
    assert!(!bldkey.to_string().contains(&bldkey.export().unwrap()));
}
