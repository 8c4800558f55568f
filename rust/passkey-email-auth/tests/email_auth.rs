use passkey_common::{Word, named_address};
use passkey_email_auth::{
    CommandParam, CommandTemplate, CommandTemplateRegistry, EmailAuth, EmailAuthError,
    EmailAuthMsg, Initializer, StaticOracles, TestEmail,
};
use pretty_assertions::assert_eq;
use testresult::TestResult;

const SALT: u64 = 0x5a17;

fn provisioned(registry: &CommandTemplateRegistry, oracles: &StaticOracles) -> TestResult<EmailAuth> {
    let wallet = named_address("wallet");
    let mut guardian = EmailAuth::initialize(Initializer {
        owner: named_address("owner"),
        account_salt: Word::from(SALT),
        controller: wallet,
    });
    guardian.update_dkim_registry(&wallet, oracles.dkim_address())?;
    guardian.update_verifier(&wallet, oracles.verifier_address())?;
    for (id, template) in registry.entries() {
        guardian.insert_command_template(&wallet, id, template.clone())?;
    }
    Ok(guardian)
}

#[test]
fn it_accepts_a_message_relayed_as_json() -> TestResult {
    let registry = CommandTemplateRegistry::bind_passkey();
    let oracles = StaticOracles::accepting();
    let mut guardian = provisioned(&registry, &oracles)?;

    let x = Word::from(11u64);
    let y = Word::from(22u64);
    let msg = TestEmail::new(registry.template_id(0), Word::from(SALT))
        .rendered(
            &registry.templates()[0],
            vec![x.as_bytes().to_vec(), y.as_bytes().to_vec()],
        )
        .timestamp(1_717_000_000)
        .build();

    let relayed: EmailAuthMsg = serde_json::from_str(&serde_json::to_string(&msg)?)?;
    assert_eq!(relayed, msg);
    assert_eq!(relayed.proof.masked_command, "Bind Pubkey 11 22");

    guardian.authenticate(&named_address("wallet"), &relayed, &oracles)?;
    Ok(())
}

#[test]
fn it_serves_a_multi_template_grammar() -> TestResult {
    let registry = CommandTemplateRegistry::new(
        "EXAMPLE_GRAMMAR_V1",
        vec![
            "Bind Pubkey {uint} {uint}".parse()?,
            "Rename wallet to {string}".parse()?,
        ],
    );
    let oracles = StaticOracles::accepting();
    let mut guardian = provisioned(&registry, &oracles)?;
    assert_eq!(guardian.template_ids().count(), 2);

    let rename: &CommandTemplate = &registry.templates()[1];
    let msg = TestEmail::new(registry.template_id(1), Word::from(SALT))
        .rendered(rename, vec![CommandParam::String("savings".into()).encode()])
        .build();
    guardian.authenticate(&named_address("wallet"), &msg, &oracles)?;

    assert_eq!(
        rename.extract(&msg.proof.masked_command)?,
        vec![CommandParam::String("savings".into())]
    );

    let unregistered = TestEmail::new(registry.template_id(2), Word::from(SALT))
        .nullifier(Word::from(2u64))
        .build();
    assert_eq!(
        guardian.authenticate(&named_address("wallet"), &unregistered, &oracles),
        Err(EmailAuthError::TemplateNotFound(registry.template_id(2)))
    );
    Ok(())
}

#[test]
fn it_rejects_params_that_do_not_fit_the_template() -> TestResult {
    let registry = CommandTemplateRegistry::bind_passkey();
    let oracles = StaticOracles::accepting();
    let mut guardian = provisioned(&registry, &oracles)?;

    let msg = TestEmail::new(registry.template_id(0), Word::from(SALT))
        .params(vec![vec![1u8; 32]])
        .command("Bind Pubkey 1")
        .build();
    assert!(matches!(
        guardian.authenticate(&named_address("wallet"), &msg, &oracles),
        Err(EmailAuthError::InvalidCommandParams(_))
    ));
    Ok(())
}
