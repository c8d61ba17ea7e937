//! The `mcqdrill init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create mcqdrill.toml
    if std::path::Path::new("mcqdrill.toml").exists() {
        println!("mcqdrill.toml already exists, skipping.");
    } else {
        std::fs::write("mcqdrill.toml", SAMPLE_CONFIG)?;
        println!("Created mcqdrill.toml");
    }

    // Create sample question bank
    let bank_path = std::path::Path::new("questions.csv");
    if bank_path.exists() {
        println!("questions.csv already exists, skipping.");
    } else {
        std::fs::write(bank_path, SAMPLE_BANK)?;
        println!("Created questions.csv");
    }

    println!("\nNext steps:");
    println!("  1. Add your own questions to questions.csv");
    println!("  2. Run: mcqdrill validate --bank questions.csv");
    println!("  3. Run: mcqdrill generate --mode topic --topic group --output session.json");
    println!("  4. Run: mcqdrill grade --session session.json --answers answers.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# mcqdrill configuration

question_bank = "questions.csv"
history_path = ".mcqdrill/history.json"
default_user = "local-user"

[mode_defaults]
full = 120
subject = 20
topic = 10
"#;

const SAMPLE_BANK: &str = r#"question,option_a,option_b,option_c,option_d,answer,subject,topic,difficulty,explanation,source
"Members who know their individual output is not identifiable tend to show:",Increased motivation,Social facilitation,Social loafing,Groupthink,Social loafing,Social Psychology,Group Processes,medium,"Effort drops when individual contributions cannot be identified.",Sample bank
"Group norms are best described as:",Unexpected standards of behavior,Legal rules enforced by authorities,Expected standards of behavior shared by members,Individual preferences,Expected standards of behavior shared by members,Social Psychology,Norms,easy,"Norms are shared expectations enforced informally by the group.",Sample bank
"A frequent outcome of groupthink is:",Careful evaluation of alternatives,Suppression of dissenting views,Increased creativity,Slower consensus,Suppression of dissenting views,Social Psychology,Group Processes,medium,"Pressure toward consensus silences dissent.",Sample bank
"Which of these is a psychoanalytic defence mechanism?",Projection,Classical conditioning,Operant shaping,Chunking,Projection,Abnormal Psychology,Defence Mechanisms,easy,"Projection attributes one's own unacceptable impulses to others.",Sample bank
"An assertion-reason item asks the examinee to:",Recall a definition,Judge whether a reason correctly explains an assertion,Rank options by preference,Compute a statistic,Judge whether a reason correctly explains an assertion,Research Methods & Statistics,Item Formats,hard,"Both statements must be evaluated and then their relation.",Sample bank
"Social facilitation refers to:",Better performance on well-learned tasks in front of others,Reduced effort in groups,Conformity to a majority,Obedience to authority,Better performance on well-learned tasks in front of others,Social Psychology,Social Facilitation,medium,"An audience improves performance on simple or practiced tasks.",Sample bank
"#;
