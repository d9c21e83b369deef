#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod error;

use alloc::string::String;
use core::num::{NonZeroI64, NonZeroU64};
use tokio_postgres::error::SqlState;

use model::{
    ad::Ad,
    contribution::{self, Contribution},
    payout::{self, Payout},
    profile::Profile,
    session::Session,
    slot::SlotId,
};

pub use futures_util::{TryStream, TryStreamExt};
pub use model;
pub use tokio_postgres::{tls::NoTls, Client, Config};

pub struct Database(Client);

impl From<Client> for Database {
    fn from(client: Client) -> Self {
        Self(client)
    }
}

/// Profile counters after one graded sheet has been folded in.
#[derive(Debug, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub streak: u16,
    pub best_streak: u16,
    pub total_score: u64,
    pub reward_balance: u64,
    /// Points awarded for this sheet alone.
    pub reward: u64,
}

fn classify(err: &tokio_postgres::Error) -> error::Error {
    let Some(err) = err.as_db_error() else {
        return error::Error::Fatal;
    };
    match *err.code() {
        SqlState::UNIQUE_VIOLATION => error::Error::AlreadyExists,
        SqlState::FOREIGN_KEY_VIOLATION => error::Error::NotFound,
        SqlState::CHECK_VIOLATION | SqlState::STRING_DATA_RIGHT_TRUNCATION => error::Error::BadInput,
        _ => error::Error::Fatal,
    }
}

fn user_from_column(id: i64) -> error::Result<NonZeroU64> {
    u64::try_from(id).ok().and_then(NonZeroU64::new).ok_or(error::Error::Fatal)
}

fn deserialize_profile_from_row(row: tokio_postgres::Row) -> error::Result<Profile> {
    let id: i64 = row.try_get("id").map_err(|_| error::Error::Fatal)?;
    let streak: i16 = row.try_get("streak").map_err(|_| error::Error::Fatal)?;
    let best_streak: i16 = row.try_get("best_streak").map_err(|_| error::Error::Fatal)?;
    let total_score: i64 = row.try_get("total_score").map_err(|_| error::Error::Fatal)?;
    let reward_balance: i64 = row.try_get("reward_balance").map_err(|_| error::Error::Fatal)?;
    let contribution_count: i32 = row.try_get("contribution_count").map_err(|_| error::Error::Fatal)?;
    Ok(Profile {
        user: user_from_column(id)?,
        name: row.try_get("name").map_err(|_| error::Error::Fatal)?,
        streak: u16::try_from(streak).map_err(|_| error::Error::Fatal)?,
        best_streak: u16::try_from(best_streak).map_err(|_| error::Error::Fatal)?,
        total_score: u64::try_from(total_score).map_err(|_| error::Error::Fatal)?,
        reward_balance: u64::try_from(reward_balance).map_err(|_| error::Error::Fatal)?,
        contribution_count: u32::try_from(contribution_count).map_err(|_| error::Error::Fatal)?,
        permissions: row.try_get("permissions").map_err(|_| error::Error::Fatal)?,
    })
}

fn deserialize_contribution_from_row(row: tokio_postgres::Row) -> error::Result<Contribution> {
    let id: i64 = row.try_get("id").map_err(|_| error::Error::Fatal)?;
    let author: i64 = row.try_get("author").map_err(|_| error::Error::Fatal)?;
    let kind: &str = row.try_get("kind").map_err(|_| error::Error::Fatal)?;
    let status: &str = row.try_get("status").map_err(|_| error::Error::Fatal)?;
    Ok(Contribution {
        id: NonZeroI64::new(id).ok_or(error::Error::Fatal)?,
        author: user_from_column(author)?,
        kind: contribution::Kind::parse(kind).ok_or(error::Error::Fatal)?,
        title: row.try_get("title").map_err(|_| error::Error::Fatal)?,
        body: row.try_get("body").map_err(|_| error::Error::Fatal)?,
        status: contribution::Status::parse(status).ok_or(error::Error::Fatal)?,
    })
}

fn deserialize_ad_from_row(row: tokio_postgres::Row) -> error::Result<Ad> {
    let id: i64 = row.try_get("id").map_err(|_| error::Error::Fatal)?;
    Ok(Ad {
        id: NonZeroI64::new(id).ok_or(error::Error::Fatal)?,
        title: row.try_get("title").map_err(|_| error::Error::Fatal)?,
        media_url: row.try_get("media_url").map_err(|_| error::Error::Fatal)?,
        placement: row.try_get("placement").map_err(|_| error::Error::Fatal)?,
        active: row.try_get("active").map_err(|_| error::Error::Fatal)?,
    })
}

fn deserialize_payout_from_row(row: tokio_postgres::Row) -> error::Result<Payout> {
    let id: i64 = row.try_get("id").map_err(|_| error::Error::Fatal)?;
    let author: i64 = row.try_get("author").map_err(|_| error::Error::Fatal)?;
    let amount: i64 = row.try_get("amount").map_err(|_| error::Error::Fatal)?;
    let status: &str = row.try_get("status").map_err(|_| error::Error::Fatal)?;
    Ok(Payout {
        id: NonZeroI64::new(id).ok_or(error::Error::Fatal)?,
        user: user_from_column(author)?,
        amount: u64::try_from(amount).map_err(|_| error::Error::Fatal)?,
        reference: row.try_get("reference").map_err(|_| error::Error::Fatal)?,
        status: payout::Status::parse(status).ok_or(error::Error::Fatal)?,
    })
}

impl Database {
    pub async fn upsert_profile(&self, user: NonZeroU64, name: &str) -> error::Result<()> {
        let uid = user.get() as i64;
        let err = match self
            .0
            .execute(
                "INSERT INTO profile (id, name) VALUES ($1, $2) \
                 ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
                &[&uid, &name],
            )
            .await
        {
            Ok(_) => return Ok(()),
            Err(err) => err,
        };

        let err = err.as_db_error().ok_or(error::Error::Fatal)?;
        Err(match (err.code(), err.constraint()) {
            (&SqlState::CHECK_VIOLATION, Some("profile_name_check")) => error::Error::BadInput,
            (&SqlState::STRING_DATA_RIGHT_TRUNCATION, _) => error::Error::BadInput,
            _ => error::Error::Fatal,
        })
    }

    pub async fn get_profile(&self, user: NonZeroU64) -> error::Result<Option<Profile>> {
        let uid = user.get() as i64;
        let row = self
            .0
            .query_opt(
                "SELECT id, name, streak, best_streak, total_score, reward_balance, contribution_count, permissions \
                 FROM profile WHERE id = $1",
                &[&uid],
            )
            .await
            .map_err(|_| error::Error::Fatal)?;
        row.map(deserialize_profile_from_row).transpose()
    }

    pub async fn leaderboard(
        &self,
        limit: i64,
    ) -> error::Result<impl TryStream<Ok = Profile, Error = error::Error> + '_> {
        Ok(self
            .0
            .query_raw(
                "SELECT id, name, streak, best_streak, total_score, reward_balance, contribution_count, permissions \
                 FROM profile ORDER BY total_score DESC, best_streak DESC, id LIMIT $1",
                &[&limit],
            )
            .await
            .map_err(|_| error::Error::Fatal)?
            .map_err(|_| error::Error::Fatal)
            .and_then(|row| core::future::ready(deserialize_profile_from_row(row))))
    }

    /// Persists a graded sheet and folds it into the author's counters in one
    /// statement, so the streak and balance can never drift from the attempt
    /// log. `passed` tells whether the sheet extends the streak.
    pub async fn record_attempt(
        &self,
        user: NonZeroU64,
        slot: SlotId,
        score: u16,
        total: u16,
        answers: &[i16],
        passed: bool,
    ) -> error::Result<AttemptOutcome> {
        let uid = user.get() as i64;
        let slot = slot.get() as i64;
        let score = i16::try_from(score).map_err(|_| error::Error::BadInput)?;
        let total = i16::try_from(total).map_err(|_| error::Error::BadInput)?;
        let err = match self
            .0
            .query_opt(
                "WITH hit AS (\
                     INSERT INTO attempt (author, slot, score, total, answers) \
                     VALUES ($1, $2, $3, $4, $5) \
                     RETURNING score, total\
                 ), old AS (\
                     SELECT streak, reward_balance FROM profile WHERE id = $1\
                 ) \
                 UPDATE profile SET \
                     streak = CASE WHEN $6 THEN old.streak + 1 ELSE 0 END, \
                     best_streak = GREATEST(profile.best_streak, CASE WHEN $6 THEN old.streak + 1 ELSE 0 END), \
                     total_score = profile.total_score + hit.score, \
                     reward_balance = old.reward_balance \
                         + (CASE WHEN hit.score = hit.total THEN 2 ELSE 1 END) \
                         * (hit.score * 10 + 5 * LEAST(CASE WHEN $6 THEN old.streak + 1 ELSE 0 END, 10)) \
                 FROM hit, old \
                 WHERE profile.id = $1 \
                 RETURNING profile.streak, profile.best_streak, profile.total_score, \
                     profile.reward_balance, profile.reward_balance - old.reward_balance AS reward",
                &[&uid, &slot, &score, &total, &answers, &passed],
            )
            .await
        {
            Ok(row) => {
                let row = row.ok_or(error::Error::NotFound)?;
                let streak: i16 = row.try_get("streak").map_err(|_| error::Error::Fatal)?;
                let best_streak: i16 = row.try_get("best_streak").map_err(|_| error::Error::Fatal)?;
                let total_score: i64 = row.try_get("total_score").map_err(|_| error::Error::Fatal)?;
                let reward_balance: i64 = row.try_get("reward_balance").map_err(|_| error::Error::Fatal)?;
                let reward: i64 = row.try_get("reward").map_err(|_| error::Error::Fatal)?;
                return Ok(AttemptOutcome {
                    streak: u16::try_from(streak).map_err(|_| error::Error::Fatal)?,
                    best_streak: u16::try_from(best_streak).map_err(|_| error::Error::Fatal)?,
                    total_score: u64::try_from(total_score).map_err(|_| error::Error::Fatal)?,
                    reward_balance: u64::try_from(reward_balance).map_err(|_| error::Error::Fatal)?,
                    reward: u64::try_from(reward).map_err(|_| error::Error::Fatal)?,
                });
            }
            Err(err) => err,
        };

        let err = err.as_db_error().ok_or(error::Error::Fatal)?;
        Err(match (err.code(), err.constraint()) {
            (&SqlState::UNIQUE_VIOLATION, Some("attempt_slot_key")) => error::Error::AlreadyExists,
            (&SqlState::CHECK_VIOLATION, Some("attempt_total_check")) => error::Error::BadInput,
            (&SqlState::FOREIGN_KEY_VIOLATION, _) => error::Error::NotFound,
            _ => error::Error::Fatal,
        })
    }

    pub async fn submit_contribution(
        &self,
        author: NonZeroU64,
        kind: contribution::Kind,
        title: &str,
        body: &str,
    ) -> error::Result<NonZeroI64> {
        let uid = author.get() as i64;
        let err = match self
            .0
            .query_opt(
                "INSERT INTO contribution (author, kind, title, body) VALUES ($1, $2, $3, $4) RETURNING id",
                &[&uid, &kind.as_str(), &title, &body],
            )
            .await
        {
            Ok(row) => {
                let row = row.ok_or(error::Error::Fatal)?;
                let id: i64 = row.try_get("id").map_err(|_| error::Error::Fatal)?;
                return NonZeroI64::new(id).ok_or(error::Error::Fatal);
            }
            Err(err) => err,
        };
        Err(classify(&err))
    }

    pub async fn pending_contributions(
        &self,
    ) -> error::Result<impl TryStream<Ok = Contribution, Error = error::Error> + '_> {
        Ok(self
            .0
            .query_raw(
                "SELECT id, author, kind, title, body, status FROM contribution \
                 WHERE status = 'pending' ORDER BY id",
                core::iter::empty::<i64>(),
            )
            .await
            .map_err(|_| error::Error::Fatal)?
            .map_err(|_| error::Error::Fatal)
            .and_then(|row| core::future::ready(deserialize_contribution_from_row(row))))
    }

    /// Flips a pending contribution to approved and credits its author's
    /// counter and reward balance in the same statement. Returns the author's
    /// new contribution count.
    pub async fn approve_contribution(&self, contribution: NonZeroI64, award: u64) -> error::Result<u32> {
        let cid = contribution.get();
        let award = i64::try_from(award).map_err(|_| error::Error::BadInput)?;
        let row = self
            .0
            .query_opt(
                "WITH approved AS (\
                     UPDATE contribution SET status = 'approved' \
                     WHERE id = $1 AND status = 'pending' \
                     RETURNING author\
                 ) \
                 UPDATE profile SET \
                     contribution_count = profile.contribution_count + 1, \
                     reward_balance = profile.reward_balance + $2 \
                 FROM approved \
                 WHERE profile.id = approved.author \
                 RETURNING profile.contribution_count",
                &[&cid, &award],
            )
            .await
            .map_err(|err| classify(&err))?
            .ok_or(error::Error::NotFound)?;
        let count: i32 = row.try_get("contribution_count").map_err(|_| error::Error::Fatal)?;
        u32::try_from(count).map_err(|_| error::Error::Fatal)
    }

    pub async fn reject_contribution(&self, contribution: NonZeroI64) -> error::Result<()> {
        let cid = contribution.get();
        match self
            .0
            .execute("UPDATE contribution SET status = 'rejected' WHERE id = $1 AND status = 'pending'", &[&cid])
            .await
        {
            Ok(1) => Ok(()),
            Ok(_) => Err(error::Error::NotFound),
            Err(_) => Err(error::Error::Fatal),
        }
    }

    pub async fn create_ad(&self, title: &str, media_url: &str, placement: &str) -> error::Result<NonZeroI64> {
        let err = match self
            .0
            .query_opt(
                "INSERT INTO ad (title, media_url, placement) VALUES ($1, $2, $3) RETURNING id",
                &[&title, &media_url, &placement],
            )
            .await
        {
            Ok(row) => {
                let row = row.ok_or(error::Error::Fatal)?;
                let id: i64 = row.try_get("id").map_err(|_| error::Error::Fatal)?;
                return NonZeroI64::new(id).ok_or(error::Error::Fatal);
            }
            Err(err) => err,
        };
        Err(classify(&err))
    }

    pub async fn active_ads(&self) -> error::Result<impl TryStream<Ok = Ad, Error = error::Error> + '_> {
        Ok(self
            .0
            .query_raw(
                "SELECT id, title, media_url, placement, active FROM ad WHERE active ORDER BY id",
                core::iter::empty::<i64>(),
            )
            .await
            .map_err(|_| error::Error::Fatal)?
            .map_err(|_| error::Error::Fatal)
            .and_then(|row| core::future::ready(deserialize_ad_from_row(row))))
    }

    pub async fn set_ad_active(&self, ad: NonZeroI64, active: bool) -> error::Result<()> {
        let aid = ad.get();
        match self.0.execute("UPDATE ad SET active = $2 WHERE id = $1", &[&aid, &active]).await {
            Ok(1) => Ok(()),
            Ok(_) => Err(error::Error::NotFound),
            Err(_) => Err(error::Error::Fatal),
        }
    }

    /// Debits the reward balance and records the payout in one statement, so
    /// an insufficient balance can never produce a dangling payout row.
    pub async fn request_payout(&self, user: NonZeroU64, amount: u64, reference: &str) -> error::Result<NonZeroI64> {
        let uid = user.get() as i64;
        let amount = i64::try_from(amount).map_err(|_| error::Error::BadInput)?;
        let err = match self
            .0
            .query_opt(
                "WITH debit AS (\
                     UPDATE profile SET reward_balance = reward_balance - $2 \
                     WHERE id = $1 AND reward_balance >= $2 \
                     RETURNING id\
                 ) \
                 INSERT INTO payout (author, amount, reference) \
                 SELECT debit.id, $2, $3 FROM debit \
                 RETURNING id",
                &[&uid, &amount, &reference],
            )
            .await
        {
            Ok(row) => {
                // No debit row means the balance was short (or the user is unknown).
                let row = row.ok_or(error::Error::BadInput)?;
                let id: i64 = row.try_get("id").map_err(|_| error::Error::Fatal)?;
                return NonZeroI64::new(id).ok_or(error::Error::Fatal);
            }
            Err(err) => err,
        };
        Err(classify(&err))
    }

    pub async fn pending_payouts(&self) -> error::Result<impl TryStream<Ok = Payout, Error = error::Error> + '_> {
        Ok(self
            .0
            .query_raw(
                "SELECT id, author, amount, reference, status FROM payout \
                 WHERE status = 'pending' ORDER BY id",
                core::iter::empty::<i64>(),
            )
            .await
            .map_err(|_| error::Error::Fatal)?
            .map_err(|_| error::Error::Fatal)
            .and_then(|row| core::future::ready(deserialize_payout_from_row(row))))
    }

    pub async fn mark_payout_paid(&self, payout: NonZeroI64) -> error::Result<()> {
        let pid = payout.get();
        match self
            .0
            .execute("UPDATE payout SET status = 'paid' WHERE id = $1 AND status = 'pending'", &[&pid])
            .await
        {
            Ok(1) => Ok(()),
            Ok(_) => Err(error::Error::NotFound),
            Err(_) => Err(error::Error::Fatal),
        }
    }

    pub async fn create_pending_session(&self, session: &[u8; 16], nonce: u64) -> error::Result<()> {
        let sid = &session[..];
        let nonce = nonce as i64;
        match self.0.execute("INSERT INTO session (id, nonce) VALUES ($1, $2)", &[&sid, &nonce]).await {
            Ok(_) => Ok(()),
            Err(err) => Err(classify(&err)),
        }
    }

    pub async fn get_session(&self, session: &[u8; 16]) -> error::Result<Option<Session>> {
        let sid = &session[..];
        let Some(row) = self
            .0
            .query_opt("SELECT nonce, author, access, refresh, expires FROM session WHERE id = $1", &[&sid])
            .await
            .map_err(|_| error::Error::Fatal)?
        else {
            return Ok(None);
        };

        let nonce: i64 = row.try_get("nonce").map_err(|_| error::Error::Fatal)?;
        let author: Option<i64> = row.try_get("author").map_err(|_| error::Error::Fatal)?;
        let Some(author) = author else {
            return Ok(Some(Session::Pending { nonce: nonce as u64 }));
        };

        let access: String = row.try_get::<_, Option<_>>("access").map_err(|_| error::Error::Fatal)?.ok_or(error::Error::Fatal)?;
        let refresh: String = row.try_get::<_, Option<_>>("refresh").map_err(|_| error::Error::Fatal)?.ok_or(error::Error::Fatal)?;
        let expires: i64 = row.try_get::<_, Option<_>>("expires").map_err(|_| error::Error::Fatal)?.ok_or(error::Error::Fatal)?;
        Ok(Some(Session::Valid {
            user: user_from_column(author)?,
            access: access.into_boxed_str(),
            refresh: refresh.into_boxed_str(),
            expires: u64::try_from(expires).map_err(|_| error::Error::Fatal)?,
        }))
    }

    pub async fn upgrade_session(
        &self,
        session: &[u8; 16],
        user: NonZeroU64,
        access: &str,
        refresh: &str,
        expires: u64,
    ) -> error::Result<bool> {
        let sid = &session[..];
        let uid = user.get() as i64;
        let expires = i64::try_from(expires).map_err(|_| error::Error::BadInput)?;
        match self
            .0
            .execute(
                "UPDATE session SET author = $2, access = $3, refresh = $4, expires = $5 \
                 WHERE id = $1 AND author IS NULL",
                &[&sid, &uid, &access, &refresh, &expires],
            )
            .await
        {
            Ok(count) => Ok(count == 1),
            Err(err) => Err(classify(&err)),
        }
    }

    pub async fn delete_session(&self, session: &[u8; 16]) -> error::Result<bool> {
        let sid = &session[..];
        match self.0.execute("DELETE FROM session WHERE id = $1", &[&sid]).await {
            Ok(count) => Ok(count == 1),
            Err(_) => Err(error::Error::Fatal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{error, Config, Database, NoTls, TryStreamExt};
    use core::num::{NonZeroI64, NonZeroU64};
    use model::{contribution, session::Session, slot::SlotId};

    #[tokio::test(flavor = "current_thread")]
    async fn database_test() {
        use std::env::var;
        // Exercised only against a live schema; see sql/init.sql.
        let (Ok(user), Ok(pass), Ok(host), Ok(data)) =
            (var("PG_USERNAME"), var("PG_PASSWORD"), var("PG_HOSTNAME"), var("PG_DATABASE"))
        else {
            return;
        };

        let (client, conn) = Config::new()
            .user(&user)
            .password(&pass)
            .host(&host)
            .dbname(&data)
            .port(5432)
            .connect(NoTls)
            .await
            .expect("cannot connect to database");
        let handle = tokio::spawn(conn);
        let db = Database::from(client);

        // Reset state from previous runs
        let uid = NonZeroU64::new(9_000_001).unwrap();
        let raw = uid.get() as i64;
        for sql in [
            "DELETE FROM attempt WHERE author = $1",
            "DELETE FROM payout WHERE author = $1",
            "DELETE FROM contribution WHERE author = $1",
            "DELETE FROM session WHERE author = $1",
            "DELETE FROM profile WHERE id = $1",
        ] {
            db.0.execute(sql, &[&raw]).await.unwrap();
        }

        // Profile creation is idempotent
        db.upsert_profile(uid, "Tester").await.unwrap();
        db.upsert_profile(uid, "Tester Renamed").await.unwrap();
        let profile = db.get_profile(uid).await.unwrap().unwrap();
        assert_eq!(profile.name, "Tester Renamed");
        assert_eq!(profile.streak, 0);
        assert_eq!(profile.reward_balance, 0);

        // A passed sheet extends the streak and pays out
        let slot = SlotId::new(1_000);
        let outcome = db.record_attempt(uid, slot, 4, 5, &[0, 1, 2, 3, 0], true).await.unwrap();
        assert_eq!(outcome.streak, 1);
        assert_eq!(outcome.best_streak, 1);
        assert_eq!(outcome.total_score, 4);
        assert_eq!(outcome.reward, 4 * 10 + 5);
        assert_eq!(outcome.reward_balance, outcome.reward);

        // Resubmission for the same slot is impossible
        assert_eq!(
            db.record_attempt(uid, slot, 5, 5, &[0, 1, 2, 3, 0], true).await.unwrap_err(),
            error::Error::AlreadyExists,
        );

        // A perfect sheet doubles the reward
        let perfect = db.record_attempt(uid, SlotId::new(1_001), 5, 5, &[1, 1, 1, 1, 1], true).await.unwrap();
        assert_eq!(perfect.streak, 2);
        assert_eq!(perfect.reward, 2 * (5 * 10 + 5 * 2));

        // A failed sheet resets the streak but keeps the best
        let failed = db.record_attempt(uid, SlotId::new(1_002), 1, 5, &[0, 0, 0, 0, 0], false).await.unwrap();
        assert_eq!(failed.streak, 0);
        assert_eq!(failed.best_streak, 2);

        // Contribution lifecycle
        let cid = db
            .submit_contribution(uid, contribution::Kind::Fact, "Fastest century", "AB de Villiers, 31 balls.")
            .await
            .unwrap();
        let pending: Vec<_> = db.pending_contributions().await.unwrap().try_collect().await.unwrap();
        assert!(pending.iter().any(|c| c.id == cid));
        let count = db.approve_contribution(cid, 25).await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(db.approve_contribution(cid, 25).await.unwrap_err(), error::Error::NotFound);
        assert_eq!(
            db.submit_contribution(uid, contribution::Kind::Post, "", "empty title").await.unwrap_err(),
            error::Error::BadInput,
        );

        // Payouts debit atomically
        let balance = db.get_profile(uid).await.unwrap().unwrap().reward_balance;
        assert_eq!(db.request_payout(uid, balance + 1, "tester@upi").await.unwrap_err(), error::Error::BadInput);
        let pid = db.request_payout(uid, balance, "tester@upi").await.unwrap();
        assert_eq!(db.get_profile(uid).await.unwrap().unwrap().reward_balance, 0);
        db.mark_payout_paid(pid).await.unwrap();
        assert_eq!(db.mark_payout_paid(pid).await.unwrap_err(), error::Error::NotFound);

        // Ads
        let aid = db.create_ad("Season pass", "https://cdn.example/banner.png", "banner").await.unwrap();
        let ads: Vec<_> = db.active_ads().await.unwrap().try_collect().await.unwrap();
        assert!(ads.iter().any(|ad| ad.id == aid));
        db.set_ad_active(aid, false).await.unwrap();
        let ads: Vec<_> = db.active_ads().await.unwrap().try_collect().await.unwrap();
        assert!(ads.iter().all(|ad| ad.id != aid));
        assert_eq!(db.set_ad_active(NonZeroI64::new(i64::MAX).unwrap(), true).await.unwrap_err(), error::Error::NotFound);

        // Session lifecycle
        let sid = [7; 16];
        db.0.execute("DELETE FROM session WHERE id = $1", &[&&sid[..]]).await.unwrap();
        db.create_pending_session(&sid, 42).await.unwrap();
        assert_eq!(db.create_pending_session(&sid, 42).await.unwrap_err(), error::Error::AlreadyExists);
        assert_eq!(db.get_session(&sid).await.unwrap().unwrap().as_nonce(), Some(42));
        assert!(db.upgrade_session(&sid, uid, "Bearer abc", "def", 4_000_000_000).await.unwrap());
        assert!(!db.upgrade_session(&sid, uid, "Bearer abc", "def", 4_000_000_000).await.unwrap());
        let session = db.get_session(&sid).await.unwrap().unwrap();
        assert_eq!(session.as_user(), Some(uid));
        assert!(matches!(session, Session::Valid { expires: 4_000_000_000, .. }));
        assert!(db.delete_session(&sid).await.unwrap());
        assert!(!db.delete_session(&sid).await.unwrap());

        drop(db);
        handle.abort();
    }
}
