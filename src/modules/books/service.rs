//! Read and write use cases of the books module.

use time::OffsetDateTime;

use super::error::BooksResult;
use super::models::{Book, BookDetail, BookId, NewReview, Review, ReviewForm};
use super::repository::BookRepository;
use super::validation::validate_review;

/// Read-only queries over the catalog.
#[derive(Debug, Clone)]
pub struct BookQueryService {
    repo: BookRepository,
}

impl BookQueryService {
    pub fn new(repo: BookRepository) -> Self {
        Self { repo }
    }

    /// All books, ordered by title.
    pub async fn list_books(&self) -> BooksResult<Vec<Book>> {
        self.repo.list_books().await
    }

    /// One book, or `NotFound`.
    pub async fn get_book(&self, id: BookId) -> BooksResult<Book> {
        self.repo.get_book(id).await
    }

    /// Reviews of a book, most recent first.
    pub async fn list_reviews_for_book(&self, book_id: BookId) -> BooksResult<Vec<Review>> {
        self.repo.list_reviews_for_book(book_id).await
    }

    /// Book plus its reviews.
    pub async fn book_detail(&self, id: BookId) -> BooksResult<BookDetail> {
        let book = self.get_book(id).await?;
        let reviews = self.list_reviews_for_book(book.id).await?;
        Ok(BookDetail { book, reviews })
    }
}

/// Accepts review submissions.
#[derive(Debug, Clone)]
pub struct ReviewService {
    repo: BookRepository,
}

impl ReviewService {
    pub fn new(repo: BookRepository) -> Self {
        Self { repo }
    }

    /// Validate and store a review for `book_id`.
    ///
    /// # Contract
    /// - Unknown book: `NotFound`, checked before the form is looked at.
    /// - Invalid form: `Validation`, nothing written.
    /// - Otherwise exactly one review is inserted, stamped with the current
    ///   UTC time.
    pub async fn submit_review(&self, book_id: BookId, form: &ReviewForm) -> BooksResult<Review> {
        let book = self.repo.get_book(book_id).await?;
        let valid = validate_review(form)?;

        let review = self
            .repo
            .insert_review(NewReview {
                book_id: book.id,
                username: valid.username,
                rating: valid.rating,
                comment: valid.comment,
                created_at: OffsetDateTime::now_utc(),
            })
            .await?;

        tracing::info!(
            book_id = review.book_id,
            review_id = review.id,
            rating = review.rating,
            "review added"
        );
        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::error::BooksError;
    use crate::modules::books::seed::seed_books;
    use crate::modules::books::test_support::migrated_repository;
    use crate::modules::books::validation::{Rating, ValidationError};
    use time::Duration;

    async fn seeded() -> (BookQueryService, ReviewService, Book) {
        let repo = migrated_repository().await;
        seed_books(&repo).await.unwrap();
        let queries = BookQueryService::new(repo.clone());
        let book = queries.list_books().await.unwrap().remove(0);
        (queries, ReviewService::new(repo), book)
    }

    #[tokio::test]
    async fn get_book_for_unknown_id_is_not_found() {
        let (queries, _, _) = seeded().await;
        assert!(matches!(
            queries.get_book(9_999).await,
            Err(BooksError::NotFound(9_999))
        ));
        assert!(matches!(
            queries.book_detail(9_999).await,
            Err(BooksError::NotFound(9_999))
        ));
    }

    #[tokio::test]
    async fn valid_submission_is_stored_and_listed_first() {
        let (queries, reviews, book) = seeded().await;

        let earlier = OffsetDateTime::now_utc() - Duration::hours(1);
        reviews
            .repo
            .insert_review(NewReview {
                book_id: book.id,
                username: "bob".to_string(),
                rating: Rating::new(3).unwrap(),
                comment: "Decent".to_string(),
                created_at: earlier,
            })
            .await
            .unwrap();

        let stored = reviews
            .submit_review(book.id, &ReviewForm::new("alice", "5", "Great read"))
            .await
            .unwrap();

        assert_eq!(stored.rating, 5);
        assert_eq!(stored.username, "alice");
        assert_eq!(stored.comment, "Great read");

        let listed = queries.list_reviews_for_book(book.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0], stored);
    }

    #[tokio::test]
    async fn out_of_range_rating_writes_nothing() {
        let (queries, reviews, book) = seeded().await;

        let err = reviews
            .submit_review(book.id, &ReviewForm::new("alice", "6", "Great read"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BooksError::Validation(ValidationError::InvalidRating(_))
        ));
        assert_eq!(err.to_string(), "Rating must be a number between 1 and 5.");
        assert!(queries
            .list_reviews_for_book(book.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn non_numeric_rating_is_rejected_like_out_of_range() {
        let (queries, reviews, book) = seeded().await;

        let err = reviews
            .submit_review(book.id, &ReviewForm::new("alice", "abc", "Great read"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Rating must be a number between 1 and 5.");
        assert!(queries
            .list_reviews_for_book(book.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn empty_username_is_rejected_with_required_message() {
        let (queries, reviews, book) = seeded().await;

        let err = reviews
            .submit_review(book.id, &ReviewForm::new("", "4", "Good"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "All fields are required.");
        assert!(queries
            .list_reviews_for_book(book.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn unknown_book_wins_over_invalid_form() {
        let (_, reviews, _) = seeded().await;

        let err = reviews
            .submit_review(424_242, &ReviewForm::default())
            .await
            .unwrap_err();

        assert!(matches!(err, BooksError::NotFound(424_242)));
    }

    #[tokio::test]
    async fn reviews_from_different_times_come_back_newest_first() {
        let (queries, reviews, book) = seeded().await;
        let now = OffsetDateTime::now_utc();

        for (name, minutes_ago) in [("two", 20), ("one", 40), ("three", 0)] {
            reviews
                .repo
                .insert_review(NewReview {
                    book_id: book.id,
                    username: name.to_string(),
                    rating: Rating::new(4).unwrap(),
                    comment: "ok".to_string(),
                    created_at: now - Duration::minutes(minutes_ago),
                })
                .await
                .unwrap();
        }

        let names: Vec<String> = queries
            .list_reviews_for_book(book.id)
            .await
            .unwrap()
            .into_iter()
            .map(|review| review.username)
            .collect();
        assert_eq!(names, vec!["three", "two", "one"]);
    }
}
